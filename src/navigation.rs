use std::sync::{Mutex, PoisonError};

use tracing::info;

/// Navigation targets used by the auth effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    /// Where a fresh login lands
    pub home: String,
    /// Where logout and expiry land
    pub login: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            home: "/".to_string(),
            login: "/auth".to_string(),
        }
    }
}

/// Fire-and-forget navigation requested by effects.
pub trait Navigator: Send + Sync {
    fn go_to(&self, path: &str);
}

/// Records the current route so the intent surface can report it.
pub struct RouteTracker {
    current: Mutex<String>,
}

impl RouteTracker {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(initial.into()),
        }
    }

    pub fn current(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RouteTracker {
    fn go_to(&self, path: &str) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != path {
            info!(from = %current, to = %path, "Navigating");
            *current = path.to_string();
        }
    }
}
