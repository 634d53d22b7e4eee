//! The closed vocabulary of intents and results carried by the action bus.

use std::fmt;

use crate::collection::Item;
use crate::session::Session;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Auth intents
    LoginStart(Credentials),
    SignupStart(Credentials),
    AutoLogin,
    Logout,
    ClearError,
    // Auth results
    AuthenticateSuccess { session: Session, redirect: bool },
    AuthenticateFail(String),
    SessionExpired,
    // Collection intents
    FetchCollection,
    StoreCollection,
    AddItem(Item),
    UpdateItem { index: usize, item: Item },
    DeleteItem(usize),
    ClearCollectionError,
    // Collection results
    SetItems(Vec<Item>),
    FetchCollectionFail(String),
    StoreCollectionFail(String),
}

/// Payload-free tag of an [`Action`], used for effect routing and supersession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    LoginStart,
    SignupStart,
    AutoLogin,
    Logout,
    ClearError,
    AuthenticateSuccess,
    AuthenticateFail,
    SessionExpired,
    FetchCollection,
    StoreCollection,
    AddItem,
    UpdateItem,
    DeleteItem,
    ClearCollectionError,
    SetItems,
    FetchCollectionFail,
    StoreCollectionFail,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::LoginStart(_) => ActionKind::LoginStart,
            Action::SignupStart(_) => ActionKind::SignupStart,
            Action::AutoLogin => ActionKind::AutoLogin,
            Action::Logout => ActionKind::Logout,
            Action::ClearError => ActionKind::ClearError,
            Action::AuthenticateSuccess { .. } => ActionKind::AuthenticateSuccess,
            Action::AuthenticateFail(_) => ActionKind::AuthenticateFail,
            Action::SessionExpired => ActionKind::SessionExpired,
            Action::FetchCollection => ActionKind::FetchCollection,
            Action::StoreCollection => ActionKind::StoreCollection,
            Action::AddItem(_) => ActionKind::AddItem,
            Action::UpdateItem { .. } => ActionKind::UpdateItem,
            Action::DeleteItem(_) => ActionKind::DeleteItem,
            Action::ClearCollectionError => ActionKind::ClearCollectionError,
            Action::SetItems(_) => ActionKind::SetItems,
            Action::FetchCollectionFail(_) => ActionKind::FetchCollectionFail,
            Action::StoreCollectionFail(_) => ActionKind::StoreCollectionFail,
        }
    }
}

impl ActionKind {
    /// Stable wire name, as reported by the HTTP surface and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::LoginStart => "login-start",
            ActionKind::SignupStart => "signup-start",
            ActionKind::AutoLogin => "auto-login",
            ActionKind::Logout => "logout",
            ActionKind::ClearError => "clear-error",
            ActionKind::AuthenticateSuccess => "authenticate-success",
            ActionKind::AuthenticateFail => "authenticate-fail",
            ActionKind::SessionExpired => "session-expired",
            ActionKind::FetchCollection => "fetch-collection",
            ActionKind::StoreCollection => "store-collection",
            ActionKind::AddItem => "add-item",
            ActionKind::UpdateItem => "update-item",
            ActionKind::DeleteItem => "delete-item",
            ActionKind::ClearCollectionError => "clear-collection-error",
            ActionKind::SetItems => "set-items",
            ActionKind::FetchCollectionFail => "fetch-collection-fail",
            ActionKind::StoreCollectionFail => "store-collection-fail",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
