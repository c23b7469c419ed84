//! DigitalOcean adapter error types

use aasemble_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigitalOceanError {
    #[error("DigitalOcean authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("DigitalOcean API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid driver arguments: {0}")]
    InvalidDriverArgs(String),

    #[error("Unsupported API version: {0}")]
    UnsupportedApiVersion(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] CloudError),
}

pub type Result<T> = std::result::Result<T, DigitalOceanError>;

impl From<DigitalOceanError> for CloudError {
    fn from(err: DigitalOceanError) -> Self {
        match err {
            DigitalOceanError::CloudError(inner) => inner,
            DigitalOceanError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            DigitalOceanError::InvalidDriverArgs(msg) => CloudError::InvalidConfig(msg),
            DigitalOceanError::IoError(e) => CloudError::Io(e),
            other => CloudError::Provider {
                provider: "digitalocean",
                source: Box::new(other),
            },
        }
    }
}
