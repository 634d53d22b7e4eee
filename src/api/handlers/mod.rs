mod auth;
mod collection;
mod state;

use serde::Serialize;

use crate::action::ActionKind;
use crate::api::response::JSend;

pub use auth::{auto_login, clear_error, login, logout, signup};
pub use collection::{add_item, delete_item, fetch_collection, store_collection, update_item};
pub use state::{get_state, health};

/// Body of every 202 answer: which intent was put on the bus
#[derive(Debug, Serialize)]
pub struct DispatchedResponse {
    pub action: &'static str,
    pub seq: u64,
}

type Accepted = (
    axum::http::StatusCode,
    axum::Json<JSend<DispatchedResponse>>,
);

fn accepted(kind: ActionKind, seq: u64) -> Accepted {
    JSend::accepted(DispatchedResponse {
        action: kind.as_str(),
        seq,
    })
}
