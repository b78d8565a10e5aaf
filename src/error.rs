//! Conversion errors.
//!
//! Every failure records the rule that rejected the cell, the wire type the
//! cell carried, the native type that was requested, and the call site that
//! asked for the conversion.

use std::fmt;
use std::panic::Location;

use thiserror::Error;

use crate::types::PgType;

/// Result type for cell conversions.
pub type TypeResult<T> = Result<T, TypeError>;

/// Stable identifier of the validation rule that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No conversion path between the wire type and the native type.
    NotImplemented,
    /// A binary-only conversion was asked of a text-format cell.
    NotBinary,
    /// Payload length differs from the native type's fixed width.
    SizeMismatch,
    /// A NULL cell was requested as a non-optional type.
    UnexpectedNull,
    /// The payload is structurally invalid for its wire type.
    InvalidData,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotImplemented => write!(f, "NOT_IMPLEMENTED"),
            ErrorKind::NotBinary => write!(f, "NOT_BINARY"),
            ErrorKind::SizeMismatch => write!(f, "SIZE_MISMATCH"),
            ErrorKind::UnexpectedNull => write!(f, "UNEXPECTED_NULL"),
            ErrorKind::InvalidData => write!(f, "INVALID_DATA"),
        }
    }
}

/// Error raised when a cell cannot be converted to or from a native type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("cannot convert {pg_type} to {expected} at {location}")]
    NotImplemented {
        pg_type: PgType,
        expected: &'static str,
        location: &'static Location<'static>,
    },

    #[error("{pg_type} cell is in text format, {expected} requires binary at {location}")]
    NotBinary {
        pg_type: PgType,
        expected: &'static str,
        location: &'static Location<'static>,
    },

    #[error("{pg_type} payload is {received} bytes, {expected} needs {size} at {location}")]
    SizeMismatch {
        pg_type: PgType,
        expected: &'static str,
        received: usize,
        size: usize,
        location: &'static Location<'static>,
    },

    #[error("NULL {pg_type} cell requested as non-optional {expected} at {location}")]
    UnexpectedNull {
        pg_type: PgType,
        expected: &'static str,
        location: &'static Location<'static>,
    },

    #[error("invalid {pg_type} payload for {expected}: {reason} at {location}")]
    InvalidData {
        pg_type: PgType,
        expected: &'static str,
        reason: String,
        location: &'static Location<'static>,
    },
}

impl TypeError {
    #[track_caller]
    pub fn not_implemented(pg_type: PgType, expected: &'static str) -> Self {
        TypeError::NotImplemented {
            pg_type,
            expected,
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn not_binary(pg_type: PgType, expected: &'static str) -> Self {
        TypeError::NotBinary {
            pg_type,
            expected,
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn size_mismatch(
        pg_type: PgType,
        expected: &'static str,
        received: usize,
        size: usize,
    ) -> Self {
        TypeError::SizeMismatch {
            pg_type,
            expected,
            received,
            size,
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn unexpected_null(pg_type: PgType, expected: &'static str) -> Self {
        TypeError::UnexpectedNull {
            pg_type,
            expected,
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn invalid_data(
        pg_type: PgType,
        expected: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        TypeError::InvalidData {
            pg_type,
            expected,
            reason: reason.into(),
            location: Location::caller(),
        }
    }

    /// Which validation rule failed.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TypeError::NotImplemented { .. } => ErrorKind::NotImplemented,
            TypeError::NotBinary { .. } => ErrorKind::NotBinary,
            TypeError::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            TypeError::UnexpectedNull { .. } => ErrorKind::UnexpectedNull,
            TypeError::InvalidData { .. } => ErrorKind::InvalidData,
        }
    }

    /// Wire type of the offending cell.
    pub fn pg_type(&self) -> PgType {
        match self {
            TypeError::NotImplemented { pg_type, .. }
            | TypeError::NotBinary { pg_type, .. }
            | TypeError::SizeMismatch { pg_type, .. }
            | TypeError::UnexpectedNull { pg_type, .. }
            | TypeError::InvalidData { pg_type, .. } => *pg_type,
        }
    }

    /// Native type the caller asked for.
    pub fn expected(&self) -> &'static str {
        match self {
            TypeError::NotImplemented { expected, .. }
            | TypeError::NotBinary { expected, .. }
            | TypeError::SizeMismatch { expected, .. }
            | TypeError::UnexpectedNull { expected, .. }
            | TypeError::InvalidData { expected, .. } => expected,
        }
    }

    /// Source location of the conversion call.
    pub fn location(&self) -> &'static Location<'static> {
        match self {
            TypeError::NotImplemented { location, .. }
            | TypeError::NotBinary { location, .. }
            | TypeError::SizeMismatch { location, .. }
            | TypeError::UnexpectedNull { location, .. }
            | TypeError::InvalidData { location, .. } => location,
        }
    }

    /// Re-point the error at a different call site.
    pub(crate) fn at(mut self, at: &'static Location<'static>) -> Self {
        match &mut self {
            TypeError::NotImplemented { location, .. }
            | TypeError::NotBinary { location, .. }
            | TypeError::SizeMismatch { location, .. }
            | TypeError::UnexpectedNull { location, .. }
            | TypeError::InvalidData { location, .. } => *location = at,
        }
        self
    }
}
