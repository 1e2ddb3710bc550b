//! Device-local session persistence.
//!
//! A single versioned record holds the logged-in client session and the
//! moment it was created. Reads validate the record; anything that fails
//! validation is reported as corrupt so the caller can force a fresh login
//! instead of acting on half-written state.

pub mod error;
pub mod record;
pub mod store;

pub use error::SessionStoreError;
pub use record::{StoredSessionRecord, CURRENT_SCHEMA_VERSION, SESSION_MAX_AGE_SECONDS};
pub use store::{SessionStore, SqliteSessionStore};
