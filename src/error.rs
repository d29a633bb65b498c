//! Error types for account database operations.
//!
//! Validation and permission errors are returned before any process is
//! spawned or file touched; command and I/O failures carry the exit code,
//! stderr or path they came from.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A mutating operation was attempted without effective UID 0.
    #[error("superuser privileges are required to {action}")]
    PermissionDenied { action: &'static str },

    /// A field name outside the closed set for this record kind.
    #[error("unknown field for {kind}: {field}")]
    UnknownField { kind: &'static str, field: String },

    /// Colons are the file format's separator and may not appear in values.
    #[error("field values cannot contain colons: {field}: {value}")]
    ColonInValue { field: &'static str, value: String },

    /// A numeric field was given a value that does not parse.
    #[error("invalid numeric value for {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    /// A recognized field with no corresponding tool flag (e.g. renaming).
    #[error("field {field} cannot be changed through set")]
    UnsupportedField { field: &'static str },

    /// An entry to add must carry a name.
    #[error("record has no name")]
    MissingName,

    /// The named entry is not present in the store.
    #[error("no such entry: {name}")]
    UnknownEntry { name: String },

    /// A field of an object-style change set failed to apply. Fields
    /// applied before this one remain applied.
    #[error("setting {field}: {source}")]
    SetField {
        field: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// The external tool could not be spawned or written to.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran and exited non-zero (or died to a signal).
    #[error("{program} exited with code {code:?}: {stderr}")]
    CommandFailed {
        program: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    /// A database file could not be read.
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
