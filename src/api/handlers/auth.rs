use axum::extract::State;
use serde::Deserialize;
use std::sync::Arc;

use super::{accepted, Accepted};
use crate::action::{Action, ActionKind, Credentials};
use crate::api::response::{ApiError, AppJson};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

fn validate_credentials(req: CredentialsRequest) -> Result<Credentials, ApiError> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("email must be a valid address"));
    }
    if req.password.is_empty() {
        return Err(ApiError::bad_request("password cannot be empty"));
    }
    Ok(Credentials::new(email, req.password))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<Accepted, ApiError> {
    let credentials = validate_credentials(req)?;
    let seq = state.dispatch(Action::LoginStart(credentials));
    Ok(accepted(ActionKind::LoginStart, seq))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<Accepted, ApiError> {
    let credentials = validate_credentials(req)?;
    let seq = state.dispatch(Action::SignupStart(credentials));
    Ok(accepted(ActionKind::SignupStart, seq))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Accepted {
    accepted(ActionKind::Logout, state.dispatch(Action::Logout))
}

pub async fn auto_login(State(state): State<Arc<AppState>>) -> Accepted {
    accepted(ActionKind::AutoLogin, state.dispatch(Action::AutoLogin))
}

pub async fn clear_error(State(state): State<Arc<AppState>>) -> Accepted {
    accepted(ActionKind::ClearError, state.dispatch(Action::ClearError))
}
