use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// The persisted form of a [`Session`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub email: String,
    pub expires_at: DateTime<Utc>,
    /// When the snapshot was written
    pub saved_at: DateTime<Utc>,
    pub token: String,
    pub user_id: String,
}

impl StoredSnapshot {
    pub fn capture(session: &Session, now: DateTime<Utc>) -> Self {
        Self {
            email: session.email.clone(),
            expires_at: session.expires_at,
            saved_at: now,
            token: session.token.clone(),
            user_id: session.user_id.clone(),
        }
    }

    pub fn into_session(self) -> Session {
        Session {
            email: self.email,
            expires_at: self.expires_at,
            token: self.token,
            user_id: self.user_id,
        }
    }
}
