use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth intents -- outcomes land in state, callers poll /state
    let auth_routes = Router::new()
        .route("/auth/auto-login", post(handlers::auto_login))
        .route("/auth/error", delete(handlers::clear_error))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/signup", post(handlers::signup));

    let collection_routes = Router::new()
        .route("/collection/fetch", post(handlers::fetch_collection))
        .route("/collection/items", post(handlers::add_item))
        .route(
            "/collection/items/:index",
            put(handlers::update_item).delete(handlers::delete_item),
        )
        .route("/collection/store", post(handlers::store_collection));

    let read_routes = Router::new()
        .route("/_internal/health", get(handlers::health))
        .route("/state", get(handlers::get_state));

    Router::new()
        .merge(auth_routes)
        .merge(collection_routes)
        .merge(read_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
