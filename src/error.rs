use thiserror::Error;

/// Reasons an estimation attempt can fail before it falls back.
///
/// None of these escape the estimator; they only feed the fallback log line.
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("Model backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model backend returned {status}: {body}")]
    BackendStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Model backend reply could not be decoded: {0}")]
    MalformedReply(#[source] serde_json::Error),

    #[error("No content in model backend reply")]
    EmptyReply,

    #[error("No JSON object found in reply")]
    NoJsonObject,

    #[error("Reply JSON is invalid: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Reply is missing or has an invalid '{field}' field")]
    IncompleteEstimate { field: &'static str },
}

pub type Result<T> = std::result::Result<T, EstimateError>;
