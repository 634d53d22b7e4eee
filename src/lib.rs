//! session-core - Session and resource orchestration for a client application
//!
//! This crate turns user intents into coordinated remote calls, timers and
//! storage operations:
//! - A closed action vocabulary reduced synchronously into one state tree
//! - Effects with switch (latest wins) or concurrent policies
//! - Session expiry via a single replaceable timer
//! - Silent session restore from a redb-backed snapshot
//! - A small REST surface for dispatching intents and reading state

pub mod action;
pub mod api;
pub mod collection;
pub mod config;
pub mod effects;
pub mod expiration;
pub mod failure;
pub mod navigation;
pub mod remote;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use action::{Action, ActionKind};
use collection::Item;
use config::Config;
use effects::EffectEnv;
use expiration::ExpirationScheduler;
use navigation::RouteTracker;
use remote::{AuthEndpoint, CollectionEndpoint};
use storage::SessionStore;
use store::Store;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{0}")]
    Failed(String),
    #[error("Action bus closed")]
    Closed,
    #[error("Timed out waiting for the collection")]
    TimedOut,
}

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub effects: Arc<EffectEnv>,
    pub navigator: Arc<RouteTracker>,
    pub store: Arc<Store>,
}

impl AppState {
    pub fn new(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        auth: Arc<dyn AuthEndpoint>,
        collection: Arc<dyn CollectionEndpoint>,
    ) -> Arc<Self> {
        let store = Arc::new(Store::new());
        let navigator = Arc::new(RouteTracker::new(config.routes.login.clone()));

        let effects = Arc::new(EffectEnv {
            auth,
            collection,
            navigator: navigator.clone(),
            routes: config.routes.clone(),
            scheduler: ExpirationScheduler::new(),
            sessions,
            store: Arc::clone(&store),
        });

        Arc::new(Self {
            config,
            effects,
            navigator,
            store,
        })
    }

    /// Start the effect pipeline. Must be called from within a tokio runtime.
    pub fn start_effects(&self, shutdown: CancellationToken) -> Vec<JoinHandle<()>> {
        effects::start(Arc::clone(&self.effects), shutdown)
    }

    pub fn dispatch(&self, action: Action) -> u64 {
        self.store.dispatch(action)
    }

    /// Fetch the collection and wait for the outcome before returning it.
    pub async fn resolve_collection(&self, timeout: Duration) -> Result<Vec<Item>, ResolveError> {
        let mut actions = self.store.actions();
        self.store.dispatch(Action::FetchCollection);

        let outcome = tokio::time::timeout(
            timeout,
            actions.next_of(&[ActionKind::SetItems, ActionKind::FetchCollectionFail]),
        )
        .await
        .map_err(|_| ResolveError::TimedOut)?;

        match outcome {
            Some(Action::SetItems(items)) => Ok(items),
            Some(Action::FetchCollectionFail(message)) => Err(ResolveError::Failed(message)),
            _ => Err(ResolveError::Closed),
        }
    }
}
