use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("session persistence error: {0}")]
    Persistence(String),
    /// The stored record failed validation. The only correct recovery is
    /// discarding it and forcing a fresh login.
    #[error("stored session is corrupt: {0}")]
    Corrupt(String),
    #[error("stored session schema version {found} is newer than supported version {supported}")]
    UnsupportedSchemaVersion { supported: u32, found: u32 },
}
