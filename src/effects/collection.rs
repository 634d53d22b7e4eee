use std::sync::Arc;

use tracing::{info, warn};

use super::{EffectDef, EffectEnv, HandlerFuture, Policy};
use crate::action::{Action, ActionKind};
use crate::collection::normalize;
use crate::failure::CollectionFailure;
use crate::state::StateTree;

pub const FETCH_COLLECTION: EffectDef = EffectDef {
    dispatch: true,
    handler: fetch_collection,
    kinds: &[ActionKind::FetchCollection],
    name: "collection_fetch",
    policy: Policy::Switch,
};

/// Emits nothing on success; failures surface as `StoreCollectionFail`.
pub const STORE_COLLECTION: EffectDef = EffectDef {
    dispatch: true,
    handler: store_collection,
    kinds: &[ActionKind::StoreCollection],
    name: "collection_store",
    policy: Policy::Concurrent,
};

fn session_token(state: &StateTree) -> Option<String> {
    state.auth.session.as_ref().map(|session| session.token.clone())
}

fn fetch_collection(env: Arc<EffectEnv>, _action: Action, state: Arc<StateTree>) -> HandlerFuture {
    let token = session_token(&state);

    Box::pin(async move {
        match env.collection.fetch_all(token.as_deref()).await {
            Ok(remote) => {
                let items = normalize(remote);
                info!(count = items.len(), "Collection fetched");
                Some(Action::SetItems(items))
            }
            Err(e) => {
                let failure = CollectionFailure::classify(&e);
                warn!(error = %e, failure = ?failure, "Collection fetch failed");
                Some(Action::FetchCollectionFail(failure.message()))
            }
        }
    })
}

fn store_collection(env: Arc<EffectEnv>, _action: Action, state: Arc<StateTree>) -> HandlerFuture {
    // The collection as of the store request; later edits are not part of this write.
    let items = state.collection.items.clone();
    let token = session_token(&state);

    Box::pin(async move {
        match env.collection.replace_all(&items, token.as_deref()).await {
            Ok(()) => {
                info!(count = items.len(), "Collection stored");
                None
            }
            Err(e) => {
                let failure = CollectionFailure::classify(&e);
                warn!(error = %e, failure = ?failure, "Collection write failed");
                Some(Action::StoreCollectionFail(failure.message()))
            }
        }
    })
}
