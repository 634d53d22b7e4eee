use chrono::{DateTime, Duration, Utc};

use crate::remote::AuthGrant;

/// The authenticated user: identity, bearer token and when it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    /// When the token stops being accepted by the remote
    pub expires_at: DateTime<Utc>,
    /// Opaque bearer token issued by the auth endpoint
    pub token: String,
    pub user_id: String,
}

impl Session {
    /// Build a session from a fresh grant, anchoring `expires_in_seconds` at `now`.
    pub fn from_grant(grant: AuthGrant, now: DateTime<Utc>) -> Self {
        let lifetime = i64::try_from(grant.expires_in_seconds).unwrap_or(i64::MAX);
        let expires_at = now
            .checked_add_signed(Duration::seconds(lifetime.min(i64::MAX / 1_000)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            email: grant.email,
            expires_at,
            token: grant.token,
            user_id: grant.user_id,
        }
    }

    /// A session is valid strictly before its expiry instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Time left until expiry, zero if already expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.expires_at - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}
