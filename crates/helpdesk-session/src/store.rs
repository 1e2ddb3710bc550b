use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::SessionStoreError;
use crate::record::{StoredSessionRecord, CURRENT_SCHEMA_VERSION};

/// Fixed key under which the session record lives, mirroring the flat
/// key-value layout of the device storage it replaces.
const KEY_SESSION: &str = "client_session";

/// Seam for the session write path. The materializer is the only caller;
/// tests substitute an in-memory fake.
pub trait SessionStore: Send {
    fn save(&mut self, record: &StoredSessionRecord) -> Result<(), SessionStoreError>;
    fn load(&self) -> Result<Option<StoredSessionRecord>, SessionStoreError>;
    fn clear(&mut self) -> Result<(), SessionStoreError>;
}

pub struct SqliteSessionStore {
    conn: Connection,
}

impl SqliteSessionStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionStoreError> {
        let conn = Connection::open(path)
            .map_err(|err| SessionStoreError::Persistence(err.to_string()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, SessionStoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|err| SessionStoreError::Persistence(err.to_string()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), SessionStoreError> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS device_storage (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                ",
            )
            .map_err(|err| SessionStoreError::Persistence(err.to_string()))
    }

    fn decode(raw: &str) -> Result<StoredSessionRecord, SessionStoreError> {
        let record: StoredSessionRecord = serde_json::from_str(raw)
            .map_err(|err| SessionStoreError::Corrupt(err.to_string()))?;
        if record.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(SessionStoreError::UnsupportedSchemaVersion {
                supported: CURRENT_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }
}

impl SessionStore for SqliteSessionStore {
    fn save(&mut self, record: &StoredSessionRecord) -> Result<(), SessionStoreError> {
        let payload = serde_json::to_string(record)
            .map_err(|err| SessionStoreError::Persistence(err.to_string()))?;
        self.conn
            .execute(
                "
                INSERT INTO device_storage (key, value, updated_at)
                VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
                params![KEY_SESSION, payload],
            )
            .map_err(|err| SessionStoreError::Persistence(err.to_string()))?;
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredSessionRecord>, SessionStoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT value FROM device_storage WHERE key = ?1",
                params![KEY_SESSION],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| SessionStoreError::Persistence(err.to_string()))?;

        match raw {
            None => Ok(None),
            Some(raw) => Self::decode(&raw).map(Some),
        }
    }

    fn clear(&mut self) -> Result<(), SessionStoreError> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM device_storage WHERE key = ?1",
                params![KEY_SESSION],
            )
            .map_err(|err| SessionStoreError::Persistence(err.to_string()))?;
        if deleted > 0 {
            debug!("cleared persisted session");
        }
        Ok(())
    }
}
