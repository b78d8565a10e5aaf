//! Tagged wire values.

use std::panic::Location;

use bytes::Bytes;

use super::{FromPg, PgType};
use crate::error::TypeResult;

/// Wire format of a cell's payload (the protocol's format code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    Text,
    #[default]
    Binary,
}

impl Format {
    /// Format code as sent in Bind / received in RowDescription.
    pub fn code(self) -> i16 {
        match self {
            Format::Text => 0,
            Format::Binary => 1,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Format::Text),
            1 => Some(Format::Binary),
            _ => None,
        }
    }
}

/// One value received from, or destined for, the server.
///
/// The payload is a shared `Bytes` handle so rows can hand out cells without
/// copying; decoded borrows (`&str`, `&[u8]`) live as long as the cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pg_type: PgType,
    format: Format,
    data: Option<Bytes>,
}

impl Cell {
    pub fn new(pg_type: PgType, format: Format, data: Option<Bytes>) -> Self {
        Self { pg_type, format, data }
    }

    /// Cell from a raw OID as reported in a RowDescription.
    pub fn from_oid(oid: u32, format: Format, data: Option<Bytes>) -> Self {
        Self::new(PgType::from_oid(oid), format, data)
    }

    pub fn binary(pg_type: PgType, data: impl Into<Bytes>) -> Self {
        Self::new(pg_type, Format::Binary, Some(data.into()))
    }

    pub fn text(pg_type: PgType, data: impl Into<Bytes>) -> Self {
        Self::new(pg_type, Format::Text, Some(data.into()))
    }

    pub fn null(pg_type: PgType, format: Format) -> Self {
        Self::new(pg_type, format, None)
    }

    pub fn pg_type(&self) -> PgType {
        self.pg_type
    }

    pub fn oid(&self) -> u32 {
        self.pg_type.oid()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    pub fn is_binary(&self) -> bool {
        self.format == Format::Binary
    }

    /// Payload bytes; empty for NULL.
    pub fn payload(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Shared handle to the payload, `None` for NULL.
    pub fn bytes(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        self.data
    }

    /// Convert the cell to a native type.
    ///
    /// Errors point at the caller of `get`.
    ///
    /// # Example
    /// ```
    /// use qail_codec::{Cell, PgType};
    ///
    /// let cell = Cell::binary(PgType::Int4, (-2147483646i32).to_be_bytes().to_vec());
    /// let n: i32 = cell.get().unwrap();
    /// assert_eq!(n, -2147483646);
    /// ```
    #[track_caller]
    pub fn get<'a, T: FromPg<'a>>(&'a self) -> TypeResult<T> {
        let location = Location::caller();
        T::from_pg(self).map_err(|err| {
            let err = err.at(location);
            tracing::debug!(
                pg_type = %err.pg_type(),
                expected = err.expected(),
                kind = %err.kind(),
                %location,
                "cell conversion failed"
            );
            err
        })
    }
}
