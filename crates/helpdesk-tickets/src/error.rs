use helpdesk_backend::BackendError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("connectivity error: {0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
}

impl From<BackendError> for TicketError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Configuration(message) => Self::Configuration(message),
            BackendError::Transport(message) => Self::Transport(message),
            BackendError::Rejected(message) => Self::Rejected(message),
        }
    }
}
