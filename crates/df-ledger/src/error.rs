// error.rs - Error types for building ledger values.

use thiserror::Error;

/// Errors raised when constructing a value that could not be written to
/// (or read back from) a commit message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Filenames end up inside a `;`-delimited single-line message.
    #[error("filename '{0}' cannot be recorded in a commit message")]
    InvalidFilename(String),

    /// URLs are recorded verbatim and must be a single whitespace-free token.
    #[error("URL '{0}' cannot be recorded in a commit message")]
    InvalidUrl(String),
}
