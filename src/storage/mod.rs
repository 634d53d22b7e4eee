pub mod db;
pub mod models;
mod tables;

pub use db::{Database, DatabaseError};
pub use models::StoredSnapshot;
pub use tables::*;

/// Durable single-slot storage for the current session.
///
/// Every call replaces or reads the whole value; there are no partial updates.
pub trait SessionStore: Send + Sync {
    fn save(&self, snapshot: &StoredSnapshot) -> Result<(), DatabaseError>;

    /// `Ok(None)` when nothing is stored. Unreadable contents are an error.
    fn load(&self) -> Result<Option<StoredSnapshot>, DatabaseError>;

    /// Returns whether a snapshot was present.
    fn clear(&self) -> Result<bool, DatabaseError>;
}
