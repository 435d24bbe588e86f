use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local input checks. The message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx answer from the planning service, already reduced to a
    /// human-readable message.
    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Voice input error: {0}")]
    Voice(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
