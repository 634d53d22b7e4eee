//! Contracts of the remote services the core talks to, plus their HTTP implementations.

mod auth;
mod collection;

pub use auth::{error_code, FirebaseAuthEndpoint};
pub use collection::FirebaseCollectionEndpoint;

use async_trait::async_trait;
use thiserror::Error;

use crate::action::Credentials;
use crate::collection::{Item, RemoteItem};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Remote rejected request with status {status} ({})", code.as_deref().unwrap_or("no code"))]
    Rejected { code: Option<String>, status: u16 },
}

/// A successful signup or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub email: String,
    pub expires_in_seconds: u64,
    pub token: String,
    pub user_id: String,
}

#[async_trait]
pub trait AuthEndpoint: Send + Sync {
    async fn signup(&self, credentials: &Credentials) -> Result<AuthGrant, RemoteError>;

    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, RemoteError>;
}

#[async_trait]
pub trait CollectionEndpoint: Send + Sync {
    /// Fetch every item, in remote order. `token` authorizes the call when present.
    async fn fetch_all(&self, token: Option<&str>) -> Result<Vec<RemoteItem>, RemoteError>;

    /// Replace the whole remote collection with `items`.
    async fn replace_all(&self, items: &[Item], token: Option<&str>) -> Result<(), RemoteError>;
}
