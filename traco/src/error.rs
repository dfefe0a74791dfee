use crate::backend::Method;
use thiserror::Error;

/// Errors produced while talking to the backend or loading configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} {path} returned status {status}")]
    Status { method: Method, path: String, status: u16 },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url `{0}`")]
    Url(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request was dropped before a response arrived")]
    Cancelled,
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    ConfigSyntax(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}
