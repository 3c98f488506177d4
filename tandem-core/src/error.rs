use thiserror::Error;

/// The relay connection could not be established.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("missing connection parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid relay url: {0}")]
    InvalidUrl(String),

    #[error("relay transport failed: {0}")]
    Transport(String),

    #[error("media session unavailable: {0}")]
    Media(String),
}
