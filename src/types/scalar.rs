//! Fixed-width, text and bytea codecs.

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

use super::numeric::decode_numeric;
use super::registry::{self, BORROWED_TEXT_TYPES, FLOATING_TYPES, INTEGRAL_TYPES, TEXT_TYPES};
use super::{Cell, Format, FromPg, PgType, ToPg, binary_payload, fixed, non_null};
use crate::error::{TypeError, TypeResult};

/// Big-endian fixed-width numbers: the wire type family must match and the
/// payload must be exactly `size_of::<T>()` bytes.
macro_rules! impl_fixed_number {
    ($ty:ty, $pg:expr, $family:expr, $name:literal) => {
        impl<'a> FromPg<'a> for $ty {
            fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
                let data = binary_payload(cell, $family, $name)?;
                Ok(<$ty>::from_be_bytes(fixed(cell, data, $name)?))
            }
        }

        impl ToPg for $ty {
            const PG_TYPE: PgType = $pg;

            fn write_binary(&self, buf: &mut BytesMut) {
                buf.put_slice(&self.to_be_bytes());
            }
        }
    };
}

impl_fixed_number!(i16, PgType::Int2, INTEGRAL_TYPES, "i16");
impl_fixed_number!(i32, PgType::Int4, INTEGRAL_TYPES, "i32");
impl_fixed_number!(i64, PgType::Int8, INTEGRAL_TYPES, "i64");
impl_fixed_number!(f32, PgType::Float4, FLOATING_TYPES, "f32");
impl_fixed_number!(f64, PgType::Float8, FLOATING_TYPES, "f64");

// ==================== bool ====================

impl<'a> FromPg<'a> for bool {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = binary_payload(cell, &[PgType::Bool], "bool")?;
        let [byte] = fixed::<1>(cell, data, "bool")?;
        Ok(byte != 0)
    }
}

impl ToPg for bool {
    const PG_TYPE: PgType = PgType::Bool;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_u8(u8::from(*self));
    }
}

// ==================== text ====================

/// Text accepts both formats; in binary the wire type must be text-like.
fn text_payload<'a>(
    cell: &'a Cell,
    allowed: &[PgType],
    expected: &'static str,
) -> TypeResult<&'a [u8]> {
    let data = non_null(cell, expected)?;
    if cell.is_binary() && !registry::accepts(allowed, cell.pg_type()) {
        return Err(TypeError::not_implemented(cell.pg_type(), expected));
    }
    Ok(data)
}

fn utf8<'a>(cell: &Cell, data: &'a [u8], expected: &'static str) -> TypeResult<&'a str> {
    match std::str::from_utf8(data) {
        Ok(text) => Ok(text),
        Err(err) => Err(TypeError::invalid_data(cell.pg_type(), expected, err.to_string())),
    }
}

/// Payload bytes as stored; bpchar keeps its blank padding.
impl<'a> FromPg<'a> for String {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = text_payload(cell, TEXT_TYPES, "String")?;
        if cell.is_binary() && cell.pg_type() == PgType::Numeric {
            return decode_numeric(data);
        }
        utf8(cell, data, "String").map(str::to_owned)
    }
}

impl<'a> FromPg<'a> for &'a str {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = text_payload(cell, BORROWED_TEXT_TYPES, "&str")?;
        utf8(cell, data, "&str")
    }
}

impl ToPg for str {
    const PG_TYPE: PgType = PgType::Text;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_slice(self.as_bytes());
    }

    /// Text format carries a trailing NUL for C-string parameter arrays.
    fn to_pg_with(&self, format: Format) -> Cell {
        let mut buf = BytesMut::with_capacity(self.len() + 1);
        buf.put_slice(self.as_bytes());
        if format == Format::Text {
            buf.put_u8(0);
        }
        Cell::new(PgType::Text, format, Some(buf.freeze()))
    }
}

impl ToPg for String {
    const PG_TYPE: PgType = PgType::Text;

    fn write_binary(&self, buf: &mut BytesMut) {
        self.as_str().write_binary(buf)
    }

    fn to_pg_with(&self, format: Format) -> Cell {
        self.as_str().to_pg_with(format)
    }
}

// ==================== bytea ====================

impl<'a> FromPg<'a> for &'a [u8] {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        binary_payload(cell, &[PgType::Bytea], "&[u8]")
    }
}

impl<'a> FromPg<'a> for Vec<u8> {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        binary_payload(cell, &[PgType::Bytea], "Vec<u8>").map(<[u8]>::to_vec)
    }
}

/// Shares the cell's buffer instead of copying it.
impl<'a> FromPg<'a> for Bytes {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        binary_payload(cell, &[PgType::Bytea], "Bytes")?;
        Ok(cell.bytes().cloned().unwrap_or_default())
    }
}

impl ToPg for [u8] {
    const PG_TYPE: PgType = PgType::Bytea;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_slice(self);
    }
}

impl ToPg for Vec<u8> {
    const PG_TYPE: PgType = PgType::Bytea;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_slice(self);
    }
}

impl ToPg for Bytes {
    const PG_TYPE: PgType = PgType::Bytea;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_slice(self);
    }

    fn to_pg_with(&self, _format: Format) -> Cell {
        Cell::binary(PgType::Bytea, self.clone())
    }
}

// ==================== uuid ====================

impl<'a> FromPg<'a> for Uuid {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = binary_payload(cell, &[PgType::Uuid], "Uuid")?;
        Ok(Uuid::from_bytes(fixed(cell, data, "Uuid")?))
    }
}

impl ToPg for Uuid {
    const PG_TYPE: PgType = PgType::Uuid;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_slice(self.as_bytes());
    }
}
