pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod wire;

pub use client::{BackendClient, ExternalLicense, VerifiedClient};
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult};
pub use transport::{JsonTransport, ReqwestJsonTransport};
