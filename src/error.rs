use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors allowed to leave the request layer.
///
/// Per-request failures (transport errors, non-2xx statuses) are never
/// represented here: they are captured as data in a `Measurement`.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("cannot summarize an empty result set")]
    Aggregation,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("artifact i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}
