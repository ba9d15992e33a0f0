// error.rs - Error types for issue tracker access.

use thiserror::Error;

/// Errors raised while talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The request could not be sent or the server answered with an error.
    #[error("HTTP request to {url} failed: {message}")]
    Http {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The server answered, but not with what we expected.
    #[error("unexpected response from {url}: {detail}")]
    InvalidResponse { url: String, detail: String },

    /// Two attachments claim the same position on the issue.
    #[error("issue {issue} lists more than one file at position {order_index}")]
    InvalidListing { issue: u64, order_index: u64 },

    /// The tracker has no such issue or file.
    #[error("{what} not found on the issue tracker")]
    NotFound { what: String },
}

pub type Result<T> = std::result::Result<T, TrackerError>;
