use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::JSend;
use crate::collection::Item;
use crate::state::{AuthPhase, StateTree};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub auth: AuthView,
    pub collection: CollectionView,
    pub route: String,
}

#[derive(Debug, Serialize)]
pub struct AuthView {
    pub error: Option<String>,
    pub phase: &'static str,
    pub session: Option<SessionView>,
}

/// The session minus its bearer token
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub email: String,
    pub expires_at: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct CollectionView {
    pub error: Option<String>,
    pub items: Vec<Item>,
}

fn phase_name(phase: AuthPhase) -> &'static str {
    match phase {
        AuthPhase::Anonymous => "anonymous",
        AuthPhase::Authenticating => "authenticating",
        AuthPhase::Authenticated => "authenticated",
        AuthPhase::Failed => "failed",
    }
}

fn state_view(tree: &StateTree) -> (AuthView, CollectionView) {
    let auth = AuthView {
        error: tree.auth.error.clone(),
        phase: phase_name(tree.auth.phase()),
        session: tree.auth.session.as_ref().map(|session| SessionView {
            email: session.email.clone(),
            expires_at: session.expires_at.to_rfc3339(),
            user_id: session.user_id.clone(),
        }),
    };
    let collection = CollectionView {
        error: tree.collection.error.clone(),
        items: tree.collection.items.clone(),
    };
    (auth, collection)
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<JSend<StateResponse>> {
    let (auth, collection) = state.store.with_state(state_view);
    JSend::success(StateResponse {
        auth,
        collection,
        route: state.navigator.current(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse { status: "ok" })
}
