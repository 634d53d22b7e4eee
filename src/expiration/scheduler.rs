use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::action::Action;
use crate::session::Session;
use crate::store::Store;

/// Owns at most one pending expiration timer.
///
/// Arming a new timer aborts the previous one; timers never stack.
#[derive(Default)]
pub struct ExpirationScheduler {
    pending: Mutex<Option<PendingExpiry>>,
}

struct PendingExpiry {
    expires_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

impl ExpirationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer for `session`, replacing any pending one.
    ///
    /// When it fires, `SessionExpired` is dispatched to `store` if `session`
    /// is still the current session.
    pub fn arm(&self, session: &Session, store: Arc<Store>) {
        let delay = session.remaining(Utc::now());
        let handle = tokio::spawn(expire_after(delay, store, session.token.clone()));

        let previous = self.pending().replace(PendingExpiry {
            expires_at: session.expires_at,
            handle,
        });
        if let Some(previous) = previous {
            previous.handle.abort();
            debug!(previous_expiry = %previous.expires_at, "Replaced pending expiration timer");
        }

        debug!(
            expires_at = %session.expires_at,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Armed expiration timer"
        );
    }

    /// Cancel the pending timer. Returns whether one was armed.
    pub fn cancel(&self) -> bool {
        match self.pending().take() {
            Some(pending) => {
                pending.handle.abort();
                debug!(expires_at = %pending.expires_at, "Cancelled expiration timer");
                true
            }
            None => false,
        }
    }

    /// Expiry instant of the timer that has not fired yet, if any.
    pub fn pending_expiry(&self) -> Option<DateTime<Utc>> {
        self.pending()
            .as_ref()
            .filter(|pending| !pending.handle.is_finished())
            .map(|pending| pending.expires_at)
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingExpiry>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ExpirationScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn expire_after(delay: Duration, store: Arc<Store>, token: String) {
    tokio::time::sleep(delay).await;

    let still_current = store.with_state(|state| {
        state
            .auth
            .session
            .as_ref()
            .is_some_and(|session| session.token == token)
    });

    if still_current {
        info!("Session expired");
        store.dispatch(Action::SessionExpired);
    } else {
        debug!("Expiration timer fired for a session that is no longer current");
    }
}
