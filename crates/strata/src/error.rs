// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy shared by every derivation, encode and decode step.
//!
//! Errors are never used for control flow: derivation steps return
//! `Result`/`Option` explicitly and an `Error` always reaches the caller of
//! `encode`/`decode` unchanged.

use std::fmt;

/// Codec engine error.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Derivation Errors
    // ========================================================================
    /// No usable construction strategy in strict mode, ambiguous member name,
    /// late registration, invalid options.
    Configuration(String),

    // ========================================================================
    // Data Errors
    // ========================================================================
    /// Encoded data rejected: disallowed discriminator tag, unknown field in
    /// strict mode, duplicate key, null for a non-nullable slot.
    Validation(String),
    /// Encoded data is not well-formed for the format adapter.
    Malformed { offset: usize, reason: String },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Underlying stream failure (cause preserved).
    Io(std::io::Error),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Reserved hook invoked on an adapter that does not implement it.
    NotSupported(&'static str),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Error::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    /// An erased value did not have the type its codec was derived for.
    pub(crate) fn mismatch(expected: &str) -> Self {
        Error::Validation(format!("value is not of type {}", expected))
    }

    /// True for `Configuration` errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// True for `Validation` errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::Validation(msg) => write!(f, "Validation error: {}", msg),
            Error::Malformed { offset, reason } => {
                write!(f, "Malformed input at offset {}: {}", offset, reason)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::NotSupported(hook) => write!(f, "Not supported: {}", hook),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display_variants() {
        let err = Error::malformed(12, "unexpected token");
        assert_eq!(
            err.to_string(),
            "Malformed input at offset 12: unexpected token"
        );
        assert_eq!(
            Error::NotSupported("write_type_tag").to_string(),
            "Not supported: write_type_tag"
        );
        assert!(Error::config("x").is_configuration());
        assert!(Error::validation("x").is_validation());
    }

    #[test]
    fn test_io_error_preserves_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io.into();
        let source = err.source().expect("io source");
        assert_eq!(source.to_string(), "pipe closed");
    }
}
