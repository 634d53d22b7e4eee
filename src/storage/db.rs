use redb::{Database as RedbDatabase, ReadTransaction, ReadableTable, WriteTransaction};
use std::path::Path;
use thiserror::Error;

use super::models::StoredSnapshot;
use super::tables::*;
use super::SessionStore;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("Deserialization error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("Serialization error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),
    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
}

/// redb-backed [`SessionStore`].
pub struct Database {
    db: RedbDatabase,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("session-core.redb");
        let db = RedbDatabase::create(db_path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SESSION_SLOT)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }
}

impl SessionStore for Database {
    fn save(&self, snapshot: &StoredSnapshot) -> Result<(), DatabaseError> {
        let data = rmp_serde::to_vec_named(snapshot)?;
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSION_SLOT)?;
            table.insert(SESSION_KEY, data.as_slice())?;
        }
        write_txn.commit()?;
        tracing::debug!(user_id = %snapshot.user_id, "Stored session snapshot");
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredSnapshot>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SESSION_SLOT)?;

        let snapshot: Option<StoredSnapshot> = match table.get(SESSION_KEY)? {
            Some(data) => Some(rmp_serde::from_slice(data.value())?),
            None => None,
        };
        Ok(snapshot)
    }

    fn clear(&self) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(SESSION_SLOT)?;
            let removed = table.remove(SESSION_KEY)?.is_some();
            removed
        };
        write_txn.commit()?;
        if removed {
            tracing::debug!("Cleared session snapshot");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_session, setup_db};
    use chrono::Utc;

    #[test]
    fn test_save_then_load_round_trips() {
        let (db, _temp) = setup_db();
        let session = make_session("tok_1", 3600);

        db.save(&StoredSnapshot::capture(&session, Utc::now()))
            .unwrap();
        let restored = db.load().unwrap().unwrap().into_session();

        assert_eq!(restored.email, session.email);
        assert_eq!(restored.user_id, session.user_id);
        assert_eq!(restored.token, session.token);
        assert_eq!(
            restored.expires_at.timestamp_millis(),
            session.expires_at.timestamp_millis()
        );
    }

    #[test]
    fn test_load_empty_slot() {
        let (db, _temp) = setup_db();
        assert!(db.load().unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let (db, _temp) = setup_db();
        db.save(&StoredSnapshot::capture(&make_session("tok_1", 60), Utc::now()))
            .unwrap();
        db.save(&StoredSnapshot::capture(&make_session("tok_2", 60), Utc::now()))
            .unwrap();

        assert_eq!(db.load().unwrap().unwrap().token, "tok_2");
    }

    #[test]
    fn test_clear() {
        let (db, _temp) = setup_db();
        db.save(&StoredSnapshot::capture(&make_session("tok_1", 60), Utc::now()))
            .unwrap();

        assert!(db.clear().unwrap());
        assert!(db.load().unwrap().is_none());
        assert!(!db.clear().unwrap());
    }

    #[test]
    fn test_unreadable_snapshot_is_an_error() {
        let (db, _temp) = setup_db();
        let write_txn = db.begin_write().unwrap();
        {
            let mut table = write_txn.open_table(SESSION_SLOT).unwrap();
            table.insert(SESSION_KEY, b"not msgpack".as_slice()).unwrap();
        }
        write_txn.commit().unwrap();

        assert!(matches!(db.load(), Err(DatabaseError::Decode(_))));
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let temp = tempfile::TempDir::new().unwrap();
        {
            let db = Database::open(temp.path()).unwrap();
            db.save(&StoredSnapshot::capture(&make_session("tok_1", 60), Utc::now()))
                .unwrap();
        }
        let db = Database::open(temp.path()).unwrap();
        assert_eq!(db.load().unwrap().unwrap().token, "tok_1");
    }
}
