//! Shared test helpers, available to all `#[cfg(test)]` modules in the crate.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::action::Credentials;
use crate::collection::{Item, RemoteItem};
use crate::config::{Config, NodeConfig, RemoteConfig};
use crate::effects::{self, EffectEnv};
use crate::expiration::ExpirationScheduler;
use crate::navigation::{Navigator, Routes};
use crate::remote::{AuthEndpoint, AuthGrant, CollectionEndpoint, RemoteError};
use crate::session::Session;
use crate::storage::Database;
use crate::store::Store;
use crate::AppState;

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard; the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// A minimal `Config` suitable for unit tests.
pub fn test_config() -> Config {
    Config {
        auto_login: false,
        node: NodeConfig {
            bind_address: "127.0.0.1:8080".to_string(),
            data_dir: "/tmp/test".to_string(),
        },
        remote: RemoteConfig {
            auth_api_key: "test-key".to_string(),
            ..RemoteConfig::default()
        },
        routes: Routes::default(),
    }
}

/// Mock endpoints behind a [`test_state`].
pub struct Mocks {
    pub auth: Arc<MockAuthEndpoint>,
    pub collection: Arc<MockCollectionEndpoint>,
}

/// Build a full `Arc<AppState>` over mocks and a temp-dir database.
///
/// Effects are not started; callers decide when to start them.
pub fn test_state() -> (Arc<AppState>, Mocks, TempDir) {
    let (db, temp) = setup_db();
    let mocks = Mocks {
        auth: Arc::new(MockAuthEndpoint::default()),
        collection: Arc::new(MockCollectionEndpoint::default()),
    };
    let state = AppState::new(
        test_config(),
        Arc::new(db),
        mocks.auth.clone(),
        mocks.collection.clone(),
    );
    (state, mocks, temp)
}

/// A session for `cook@example.com` expiring `ttl_seconds` from now.
pub fn make_session(token: &str, ttl_seconds: i64) -> Session {
    Session {
        email: "cook@example.com".to_string(),
        expires_at: Utc::now() + chrono::Duration::seconds(ttl_seconds),
        token: token.to_string(),
        user_id: format!("user-{token}"),
    }
}

/// An item with only an id and no ingredients.
pub fn make_item(id: &str) -> Item {
    let mut fields = Map::new();
    fields.insert("id".to_string(), Value::String(id.to_string()));
    Item::new(fields, Vec::new())
}

pub fn grant(token: &str, expires_in_seconds: u64) -> AuthGrant {
    AuthGrant {
        email: "cook@example.com".to_string(),
        expires_in_seconds,
        token: token.to_string(),
        user_id: format!("user-{token}"),
    }
}

type Scripted<T> = (Result<T, RemoteError>, Duration);

/// Auth endpoint answering from scripted queues.
///
/// Responses queued for a specific email take precedence over the shared queue.
/// An exhausted queue answers with a rejection without code.
#[derive(Default)]
pub struct MockAuthEndpoint {
    login: Mutex<HashMap<Option<String>, VecDeque<Scripted<AuthGrant>>>>,
    signup: Mutex<VecDeque<Scripted<AuthGrant>>>,
}

impl MockAuthEndpoint {
    pub fn push_login(&self, result: Result<AuthGrant, RemoteError>, delay: Duration) {
        self.login
            .lock()
            .unwrap()
            .entry(None)
            .or_default()
            .push_back((result, delay));
    }

    pub fn push_login_for(&self, email: &str, result: Result<AuthGrant, RemoteError>, delay: Duration) {
        self.login
            .lock()
            .unwrap()
            .entry(Some(email.to_string()))
            .or_default()
            .push_back((result, delay));
    }

    pub fn push_signup(&self, result: Result<AuthGrant, RemoteError>, delay: Duration) {
        self.signup.lock().unwrap().push_back((result, delay));
    }

    fn next_login(&self, email: &str) -> Option<Scripted<AuthGrant>> {
        let mut queues = self.login.lock().unwrap();
        if let Some(scripted) = queues
            .get_mut(&Some(email.to_string()))
            .and_then(VecDeque::pop_front)
        {
            return Some(scripted);
        }
        queues.get_mut(&None).and_then(VecDeque::pop_front)
    }
}

async fn play<T>(scripted: Option<Scripted<T>>) -> Result<T, RemoteError> {
    match scripted {
        Some((result, delay)) => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
        None => Err(RemoteError::Rejected {
            code: None,
            status: 500,
        }),
    }
}

#[async_trait]
impl AuthEndpoint for MockAuthEndpoint {
    async fn signup(&self, _credentials: &Credentials) -> Result<AuthGrant, RemoteError> {
        let scripted = self.signup.lock().unwrap().pop_front();
        play(scripted).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, RemoteError> {
        let scripted = self.next_login(&credentials.email);
        play(scripted).await
    }
}

/// Collection endpoint answering fetches from a queue and recording writes.
///
/// An exhausted fetch queue answers with an empty collection.
#[derive(Default)]
pub struct MockCollectionEndpoint {
    fetches: Mutex<VecDeque<Scripted<Vec<RemoteItem>>>>,
    fetch_tokens: Mutex<Vec<Option<String>>>,
    write_failure: Mutex<Option<RemoteError>>,
    writes: Mutex<Vec<Vec<Item>>>,
}

impl MockCollectionEndpoint {
    pub fn push_fetch(&self, result: Result<Vec<RemoteItem>, RemoteError>, delay: Duration) {
        self.fetches.lock().unwrap().push_back((result, delay));
    }

    pub fn fail_next_write(&self, error: RemoteError) {
        *self.write_failure.lock().unwrap() = Some(error);
    }

    pub fn fetch_tokens(&self) -> Vec<Option<String>> {
        self.fetch_tokens.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Vec<Item>> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CollectionEndpoint for MockCollectionEndpoint {
    async fn fetch_all(&self, token: Option<&str>) -> Result<Vec<RemoteItem>, RemoteError> {
        self.fetch_tokens
            .lock()
            .unwrap()
            .push(token.map(str::to_string));
        let scripted = self.fetches.lock().unwrap().pop_front();
        match scripted {
            Some(_) => play(scripted).await,
            None => Ok(Vec::new()),
        }
    }

    async fn replace_all(&self, items: &[Item], _token: Option<&str>) -> Result<(), RemoteError> {
        if let Some(error) = self.write_failure.lock().unwrap().take() {
            return Err(error);
        }
        self.writes.lock().unwrap().push(items.to_vec());
        Ok(())
    }
}

/// Navigator remembering every requested route, in order.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, path: &str) {
        self.routes.lock().unwrap().push(path.to_string());
    }
}

/// A running effect pipeline wired to mocks and a temp-dir database.
pub struct TestHarness {
    pub auth: Arc<MockAuthEndpoint>,
    pub collection: Arc<MockCollectionEndpoint>,
    pub env: Arc<EffectEnv>,
    pub navigator: Arc<RecordingNavigator>,
    pub sessions: Arc<Database>,
    pub store: Arc<Store>,
    shutdown: CancellationToken,
    _temp: TempDir,
}

impl TestHarness {
    /// Must be called from within a tokio runtime.
    pub fn start() -> Self {
        let (db, temp) = setup_db();
        let auth = Arc::new(MockAuthEndpoint::default());
        let collection = Arc::new(MockCollectionEndpoint::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let sessions = Arc::new(db);
        let store = Arc::new(Store::new());

        let env = Arc::new(EffectEnv {
            auth: auth.clone(),
            collection: collection.clone(),
            navigator: navigator.clone(),
            routes: Routes::default(),
            scheduler: ExpirationScheduler::new(),
            sessions: sessions.clone(),
            store: Arc::clone(&store),
        });

        let shutdown = CancellationToken::new();
        effects::start(Arc::clone(&env), shutdown.clone());

        Self {
            auth,
            collection,
            env,
            navigator,
            sessions,
            store,
            shutdown,
            _temp: temp,
        }
    }

    /// Give spawned effect tasks time to finish their side effects.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
