//! The authoritative state tree and the pure reducers that advance it.

use crate::action::Action;
use crate::collection::Item;
use crate::session::Session;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateTree {
    pub auth: AuthState,
    pub collection: CollectionState,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub error: Option<String>,
    /// A login or signup call is outstanding
    pub loading: bool,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    /// Last fetch or write failure, if any
    pub error: Option<String>,
    pub items: Vec<Item>,
}

/// Lifecycle phase derived from [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    Failed,
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        if self.loading {
            AuthPhase::Authenticating
        } else if self.session.is_some() {
            AuthPhase::Authenticated
        } else if self.error.is_some() {
            AuthPhase::Failed
        } else {
            AuthPhase::Anonymous
        }
    }
}

/// Root reducer. Unrelated actions return an equal tree.
pub fn reduce(state: &StateTree, action: &Action) -> StateTree {
    StateTree {
        auth: reduce_auth(&state.auth, action),
        collection: reduce_collection(&state.collection, action),
    }
}

pub fn reduce_auth(state: &AuthState, action: &Action) -> AuthState {
    match action {
        Action::LoginStart(_) | Action::SignupStart(_) => AuthState {
            error: None,
            loading: true,
            ..state.clone()
        },
        Action::AuthenticateSuccess { session, .. } => AuthState {
            error: None,
            loading: false,
            session: Some(session.clone()),
        },
        Action::AuthenticateFail(message) => AuthState {
            error: Some(message.clone()),
            loading: false,
            session: None,
        },
        Action::Logout | Action::SessionExpired => AuthState {
            session: None,
            ..state.clone()
        },
        Action::ClearError => AuthState {
            error: None,
            ..state.clone()
        },
        _ => state.clone(),
    }
}

pub fn reduce_collection(state: &CollectionState, action: &Action) -> CollectionState {
    match action {
        Action::SetItems(items) => CollectionState {
            error: None,
            items: items.clone(),
        },
        Action::AddItem(item) => {
            let mut items = state.items.clone();
            items.push(item.clone());
            CollectionState {
                items,
                ..state.clone()
            }
        }
        Action::UpdateItem { index, item } if *index < state.items.len() => {
            let mut items = state.items.clone();
            items[*index] = item.clone();
            CollectionState {
                items,
                ..state.clone()
            }
        }
        Action::DeleteItem(index) if *index < state.items.len() => {
            let mut items = state.items.clone();
            items.remove(*index);
            CollectionState {
                items,
                ..state.clone()
            }
        }
        Action::FetchCollectionFail(message) | Action::StoreCollectionFail(message) => {
            CollectionState {
                error: Some(message.clone()),
                ..state.clone()
            }
        }
        Action::StoreCollection | Action::ClearCollectionError => CollectionState {
            error: None,
            ..state.clone()
        },
        _ => state.clone(),
    }
}
