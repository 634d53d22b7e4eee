use axum::extract::{Path, State};
use std::sync::Arc;

use super::{accepted, Accepted};
use crate::action::{Action, ActionKind};
use crate::api::response::{ApiError, AppJson};
use crate::collection::{Item, RemoteItem};
use crate::AppState;

pub async fn fetch_collection(State(state): State<Arc<AppState>>) -> Accepted {
    accepted(
        ActionKind::FetchCollection,
        state.dispatch(Action::FetchCollection),
    )
}

pub async fn store_collection(State(state): State<Arc<AppState>>) -> Accepted {
    accepted(
        ActionKind::StoreCollection,
        state.dispatch(Action::StoreCollection),
    )
}

pub async fn add_item(
    State(state): State<Arc<AppState>>,
    AppJson(item): AppJson<RemoteItem>,
) -> Accepted {
    let seq = state.dispatch(Action::AddItem(Item::from(item)));
    accepted(ActionKind::AddItem, seq)
}

pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    AppJson(item): AppJson<RemoteItem>,
) -> Result<Accepted, ApiError> {
    ensure_index(&state, index)?;
    let seq = state.dispatch(Action::UpdateItem {
        index,
        item: Item::from(item),
    });
    Ok(accepted(ActionKind::UpdateItem, seq))
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Accepted, ApiError> {
    ensure_index(&state, index)?;
    let seq = state.dispatch(Action::DeleteItem(index));
    Ok(accepted(ActionKind::DeleteItem, seq))
}

fn ensure_index(state: &AppState, index: usize) -> Result<(), ApiError> {
    let len = state.store.with_state(|s| s.collection.items.len());
    if index >= len {
        return Err(ApiError::not_found(format!(
            "No item at index {index} (collection has {len})"
        )));
    }
    Ok(())
}
