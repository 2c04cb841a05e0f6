use thiserror::Error;

/// Failures surfaced by the judge client. Every variant ends the operation
/// that produced it; nothing is retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Editor is empty. Write code before submitting.")]
    BlankCode,

    /// The server refused the submission for arriving too soon. The message
    /// is the server's own text and is shown verbatim.
    #[error("{0}")]
    RateLimited(String),

    #[error("server responded with {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("submission response did not contain a submission id")]
    MissingSubmissionId,

    #[error("gave up waiting for a verdict after {0} seconds")]
    PollTimedOut(u64),

    #[error("polling was cancelled")]
    PollCancelled,

    #[error("{0}")]
    InvalidProfileForm(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
