//! Error types for LZMA encoding.
//!
//! This module provides the [`Error`] enum which represents every way an
//! encoding run can fail, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Kinds
//!
//! - [`Error::InvalidConfiguration`]: an encoder option is out of range.
//!   Raised when the encoder is constructed, before any input is read.
//! - [`Error::Io`]: the input or output stream failed. The underlying
//!   [`std::io::Error`] is passed through unchanged and nothing is retried.
//! - [`Error::Cancelled`]: the progress reporter asked to stop. Raised only
//!   between chunks, never inside a parse window.
//!
//! A run that fails with `Io` or `Cancelled` leaves a truncated output
//! stream behind. That output is not decodable and must be discarded.
//!
//! # Example
//!
//! ```rust
//! use lzopt::{EncoderOptions, Error};
//!
//! let err = EncoderOptions::new().fast_bytes(1).validate().unwrap_err();
//! match err {
//!     Error::InvalidConfiguration { parameter, .. } => assert_eq!(parameter, "fast_bytes"),
//!     other => panic!("unexpected error: {other}"),
//! }
//! ```

use std::io;

/// The error type for encoding operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading input or writing output.
    ///
    /// The original error is preserved verbatim.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An encoder option is outside its supported range.
    ///
    /// `parameter` names the offending option, `reason` describes the
    /// accepted values.
    #[error("Invalid configuration for {parameter}: {reason}")]
    InvalidConfiguration {
        /// Name of the rejected option.
        parameter: &'static str,
        /// Description of the accepted range.
        reason: String,
    },

    /// The operation was cancelled through the progress reporter.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Creates an [`Error::InvalidConfiguration`].
    pub(crate) fn invalid_config(parameter: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            parameter,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error was raised by option validation.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::InvalidConfiguration { .. })
    }

    /// Returns `true` if the run was cancelled by the progress reporter.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// A specialized Result type for encoding operations.
pub type Result<T> = std::result::Result<T, Error>;
