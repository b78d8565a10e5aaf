//! PostgreSQL binary type codecs.
//!
//! `FromPg` turns a [`Cell`] into a native value after checking the cell's
//! format, wire type and payload size; `ToPg` produces a binary cell tagged
//! with the single wire type registered for the native type.
//!
//! | Rust type                      | Wire type(s) decoded                       | Encodes as     |
//! |--------------------------------|--------------------------------------------|----------------|
//! | `bool`                         | bool                                       | bool           |
//! | `i16`, `i32`, `i64`            | int2, int4, int8 (exact width)             | int2/int4/int8 |
//! | `f32`, `f64`                   | float4, float8 (exact width)               | float4/float8  |
//! | `String`                       | text, bpchar, varchar, name, numeric, json | text           |
//! | `&str`                         | text, bpchar, varchar, name, json          | text           |
//! | `&[u8]`, `Vec<u8>`, `Bytes`    | bytea                                      | bytea          |
//! | `Uuid`                         | uuid                                       | uuid           |
//! | `Numeric`                      | numeric                                    | numeric        |
//! | `serde_json::Value`, `Json<T>` | json                                       | json           |
//! | `NaiveDate`                    | date                                       | date           |
//! | `NaiveTime`                    | time                                       | time           |
//! | `NaiveDateTime`                | timestamp                                  | timestamp      |
//! | `DateTime<Utc>`                | timestamptz                                | timestamptz    |
//!
//! `Option<T>` maps NULL to `None` in both directions.

mod cell;
mod document;
pub mod json;
pub mod numeric;
pub mod pg_type;
pub mod registry;
mod scalar;
pub mod temporal;

pub use cell::{Cell, Format};
pub use json::Json;
pub use numeric::Numeric;
pub use pg_type::{PgType, array_element, oid};

use bytes::BytesMut;

use crate::error::{TypeError, TypeResult};

/// Decode a native value from a cell.
pub trait FromPg<'a>: Sized {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self>;
}

/// Encode a native value as a cell.
pub trait ToPg {
    /// The one wire type this native type encodes as.
    const PG_TYPE: PgType;

    /// Append the binary wire representation to `buf`.
    fn write_binary(&self, buf: &mut BytesMut);

    /// Encode in the requested format.
    ///
    /// Only text-like types honor `Format::Text`; everything else is always
    /// produced in binary.
    fn to_pg_with(&self, _format: Format) -> Cell {
        let mut buf = BytesMut::with_capacity(registry::fixed_size(Self::PG_TYPE).unwrap_or(0));
        self.write_binary(&mut buf);
        Cell::binary(Self::PG_TYPE, buf.freeze())
    }

    fn to_pg(&self) -> Cell {
        self.to_pg_with(Format::Binary)
    }
}

/// Decode `cell` as `T` (the `Cell::get` free-function form).
#[track_caller]
pub fn decode<'a, T: FromPg<'a>>(cell: &'a Cell) -> TypeResult<T> {
    cell.get()
}

/// Encode `value` as a binary cell.
pub fn encode<T: ToPg + ?Sized>(value: &T) -> Cell {
    value.to_pg()
}

/// Encode `value`, asking for `format` where the type supports it.
pub fn encode_with<T: ToPg + ?Sized>(value: &T, format: Format) -> Cell {
    value.to_pg_with(format)
}

impl<'a, T: FromPg<'a>> FromPg<'a> for Option<T> {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        if cell.is_null() {
            Ok(None)
        } else {
            T::from_pg(cell).map(Some)
        }
    }
}

impl<T: ToPg> ToPg for Option<T> {
    const PG_TYPE: PgType = T::PG_TYPE;

    fn write_binary(&self, buf: &mut BytesMut) {
        if let Some(value) = self {
            value.write_binary(buf);
        }
    }

    fn to_pg_with(&self, format: Format) -> Cell {
        match self {
            Some(value) => value.to_pg_with(format),
            None => Cell::null(T::PG_TYPE, format),
        }
    }
}

impl<T: ToPg + ?Sized> ToPg for &T {
    const PG_TYPE: PgType = T::PG_TYPE;

    fn write_binary(&self, buf: &mut BytesMut) {
        (**self).write_binary(buf)
    }

    fn to_pg_with(&self, format: Format) -> Cell {
        (**self).to_pg_with(format)
    }
}

// ==================== Shared validation ====================

/// Payload of a non-NULL cell.
pub(crate) fn non_null<'a>(cell: &'a Cell, expected: &'static str) -> TypeResult<&'a [u8]> {
    match cell.bytes() {
        Some(data) => Ok(&data[..]),
        None => Err(TypeError::unexpected_null(cell.pg_type(), expected)),
    }
}

/// Payload of a binary cell whose type is in `allowed`.
pub(crate) fn binary_payload<'a>(
    cell: &'a Cell,
    allowed: &[PgType],
    expected: &'static str,
) -> TypeResult<&'a [u8]> {
    let data = non_null(cell, expected)?;
    if !cell.is_binary() {
        return Err(TypeError::not_binary(cell.pg_type(), expected));
    }
    if !registry::accepts(allowed, cell.pg_type()) {
        return Err(TypeError::not_implemented(cell.pg_type(), expected));
    }
    Ok(data)
}

/// Exact-width view of a payload.
pub(crate) fn fixed<const N: usize>(
    cell: &Cell,
    data: &[u8],
    expected: &'static str,
) -> TypeResult<[u8; N]> {
    match <[u8; N]>::try_from(data) {
        Ok(bytes) => Ok(bytes),
        Err(_) => Err(TypeError::size_mismatch(cell.pg_type(), expected, data.len(), N)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_option_null_is_none() {
        let cell = Cell::null(PgType::Int4, Format::Binary);
        let value: Option<i32> = cell.get().unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_option_non_null_is_some() {
        let cell = 7i32.to_pg();
        assert_eq!(cell.get::<Option<i32>>().unwrap(), Some(7));
    }

    #[test]
    fn test_null_as_required_fails() {
        let cell = Cell::null(PgType::Int4, Format::Binary);
        let err = cell.get::<i32>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedNull);
    }

    #[test]
    fn test_option_encodes_null_with_inner_type() {
        let cell = None::<i64>.to_pg();
        assert!(cell.is_null());
        assert_eq!(cell.pg_type(), PgType::Int8);
    }

    #[test]
    fn test_free_functions() {
        let cell = encode(&42i16);
        assert_eq!(decode::<i16>(&cell).unwrap(), 42);
        let cell = encode_with(&"abc", Format::Text);
        assert_eq!(cell.format(), Format::Text);
    }

    #[test]
    fn test_fixed_width_ignores_text_format() {
        let cell = encode_with(&-2i32, Format::Text);
        assert_eq!(cell.format(), Format::Binary);
        assert_eq!(cell.payload(), &(-2i32).to_be_bytes());
    }
}
