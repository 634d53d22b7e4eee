use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AuthEndpoint, AuthGrant, RemoteError};
use crate::action::Credentials;

/// Identity-toolkit style auth endpoint (`signupNewUser` / `verifyPassword`).
pub struct FirebaseAuthEndpoint {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    email: String,
    /// Lifetime in seconds, sent as a decimal string
    expires_in: String,
    id_token: String,
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl FirebaseAuthEndpoint {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn authenticate(
        &self,
        operation: &str,
        credentials: &Credentials,
    ) -> Result<AuthGrant, RemoteError> {
        let url = format!("{}/{operation}", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&AuthRequest {
                email: &credentials.email,
                password: &credentials.password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let code = error_code(&body);
            debug!(operation, status = status.as_u16(), code = ?code, "Auth request rejected");
            return Err(RemoteError::Rejected {
                code,
                status: status.as_u16(),
            });
        }

        let data: AuthResponse = response.json().await?;
        grant_from_response(data)
    }
}

/// Extract the server error code from an `{"error": {"message": CODE}}` body.
pub fn error_code(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
}

fn grant_from_response(data: AuthResponse) -> Result<AuthGrant, RemoteError> {
    let expires_in_seconds = data.expires_in.trim().parse::<u64>().map_err(|_| {
        RemoteError::Malformed(format!("expiresIn is not a number: {:?}", data.expires_in))
    })?;
    if data.id_token.is_empty() {
        return Err(RemoteError::Malformed("idToken is empty".to_string()));
    }

    Ok(AuthGrant {
        email: data.email,
        expires_in_seconds,
        token: data.id_token,
        user_id: data.local_id,
    })
}

#[async_trait]
impl AuthEndpoint for FirebaseAuthEndpoint {
    async fn signup(&self, credentials: &Credentials) -> Result<AuthGrant, RemoteError> {
        self.authenticate("signupNewUser", credentials).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, RemoteError> {
        self.authenticate("verifyPassword", credentials).await
    }
}
