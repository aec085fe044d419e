//! Application Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the subsystem a failure came from.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration could not be loaded or validated.
    Config,
    /// The marketplace client could not be built or the request failed.
    Extract,
    /// The raw snapshot could not be written.
    Snapshot,
    /// Opening or querying the store failed.
    Store,
    /// A command-line argument was well-formed for the parser but not for
    /// the table (unknown key in a record, wrong JSON shape).
    #[display("invalid argument: {_0}")]
    Argument(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Extract)
    }
}
