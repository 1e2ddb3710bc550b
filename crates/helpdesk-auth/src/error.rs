use helpdesk_backend::BackendError;
use helpdesk_domain::ValidationError;
use helpdesk_session::SessionStoreError;
use thiserror::Error;

/// Login-flow failure taxonomy. Validation failures never reach the
/// network; transport failures render as one generic connectivity message;
/// rejections carry the server's own wording.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("connectivity error: {0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
    #[error("the code has expired; request a new one")]
    ChallengeExpired,
    #[error("no code challenge is awaiting a code")]
    ChallengeNotPending,
    #[error("a verification is already in progress")]
    VerificationInFlight,
    #[error("a new code can be requested in {0} seconds")]
    ResendUnavailable(u64),
    #[error("the challenge was replaced before this result arrived")]
    Superseded,
    #[error("session persistence error: {0}")]
    Persistence(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Configuration(message) => Self::Configuration(message),
            BackendError::Transport(message) => Self::Transport(message),
            BackendError::Rejected(message) => Self::Rejected(message),
        }
    }
}

impl From<SessionStoreError> for AuthError {
    fn from(err: SessionStoreError) -> Self {
        Self::Persistence(err.to_string())
    }
}
