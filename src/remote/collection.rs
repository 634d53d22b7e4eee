use async_trait::async_trait;
use reqwest::RequestBuilder;
use tracing::debug;

use super::{CollectionEndpoint, RemoteError};
use crate::collection::{Item, RemoteItem};

/// Realtime-database style collection stored as one JSON document.
pub struct FirebaseCollectionEndpoint {
    client: reqwest::Client,
    url: String,
}

impl FirebaseCollectionEndpoint {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }
}

fn rejected(status: reqwest::StatusCode) -> RemoteError {
    RemoteError::Rejected {
        code: status.canonical_reason().map(str::to_string),
        status: status.as_u16(),
    }
}

#[async_trait]
impl CollectionEndpoint for FirebaseCollectionEndpoint {
    async fn fetch_all(&self, token: Option<&str>) -> Result<Vec<RemoteItem>, RemoteError> {
        let response = Self::authorize(self.client.get(&self.url), token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status));
        }

        // An empty collection is stored as JSON `null`.
        let items: Option<Vec<RemoteItem>> = response.json().await?;
        let items = items.unwrap_or_default();
        debug!(count = items.len(), "Fetched collection");
        Ok(items)
    }

    async fn replace_all(&self, items: &[Item], token: Option<&str>) -> Result<(), RemoteError> {
        let response = Self::authorize(self.client.put(&self.url), token)
            .json(items)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status));
        }

        debug!(count = items.len(), "Replaced collection");
        Ok(())
    }
}
