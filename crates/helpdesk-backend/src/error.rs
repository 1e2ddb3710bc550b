use thiserror::Error;

/// Backend failure taxonomy.
///
/// `Transport` covers timeouts, unreachable hosts, and bodies that fail to
/// decode; it renders as one generic connectivity message. `Rejected`
/// carries the server's own user-facing message for business failures
/// (license not found, OTP incorrect) and is surfaced distinctly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("connectivity error: {0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
}

pub type BackendResult<T> = Result<T, BackendError>;
