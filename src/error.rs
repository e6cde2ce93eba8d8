//! Error types for alarmtab.
//!
//! This module defines the unified error enum used throughout the crate. All fallible
//! operations return `Result<T, Error>`. Front ends classify failures through
//! [`Error::outcome`] to pick the message they show.
//!
//! Read paths never produce an error: an unreadable or undecodable file is treated as an
//! empty table. Only write paths and the pre-write checks (validation, uniqueness, lookup)
//! report failures.

use std::fmt;

/// Unified error type for all alarmtab operations.
///
/// Every variant other than `Io` is raised before the file is touched, so the file is
/// unchanged when one of them is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A submitted value is unusable (e.g. an empty identifier).
    #[error("invalid entry: {0}")]
    Validation(String),

    /// Another record already uses this identifier.
    #[error("ID '{id}' already exists")]
    DuplicateId {
        /// The identifier that collided.
        id: String,
    },

    /// No data record has this identifier.
    #[error("ID '{id}' not found in file")]
    NotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// The session has no file selected.
    #[error("no alarm file selected")]
    NoActiveFile,

    /// A save was requested while no record is being edited.
    #[error("no record is being edited")]
    NotEditing,

    /// An I/O error occurred while writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classification of an operation result for user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Validation,
    DuplicateId,
    NotFound,
    IoError,
}

impl Error {
    /// The [`Outcome`] a front end should report for this error.
    ///
    /// Session precondition failures are reported as validation failures.
    pub fn outcome(&self) -> Outcome {
        match self {
            Error::Validation(_) | Error::NoActiveFile | Error::NotEditing => Outcome::Validation,
            Error::DuplicateId { .. } => Outcome::DuplicateId,
            Error::NotFound { .. } => Outcome::NotFound,
            Error::Io(_) => Outcome::IoError,
        }
    }
}

impl<T> From<&Result<T, Error>> for Outcome {
    fn from(result: &Result<T, Error>) -> Self {
        match result {
            Ok(_) => Outcome::Ok,
            Err(e) => e.outcome(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Ok => "ok",
            Outcome::Validation => "validation",
            Outcome::DuplicateId => "duplicate-id",
            Outcome::NotFound => "not-found",
            Outcome::IoError => "io-error",
        };
        f.write_str(label)
    }
}
