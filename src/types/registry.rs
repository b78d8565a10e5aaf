//! Native type ⇄ wire type registry.
//!
//! Encoding is a bijection: every `ToPg` impl names exactly one `PgType`
//! through its `PG_TYPE` constant. Decoding is many-to-one where the wire
//! layouts allow it, and those sets live here so every `FromPg` impl checks
//! against the same table.

use super::PgType;

/// Wire types readable as a native string.
///
/// Numeric is listed because its decode path produces decimal text, not
/// because its payload is character data.
pub const TEXT_TYPES: &[PgType] = &[
    PgType::Text,
    PgType::Bpchar,
    PgType::Varchar,
    PgType::Name,
    PgType::Numeric,
    PgType::Json,
];

/// Wire types whose payload can be borrowed as `&str` without conversion.
pub const BORROWED_TEXT_TYPES: &[PgType] = &[
    PgType::Text,
    PgType::Bpchar,
    PgType::Varchar,
    PgType::Name,
    PgType::Json,
];

/// Fixed-width big-endian integers.
pub const INTEGRAL_TYPES: &[PgType] = &[PgType::Int2, PgType::Int4, PgType::Int8];

/// IEEE 754 big-endian floats.
pub const FLOATING_TYPES: &[PgType] = &[PgType::Float4, PgType::Float8];

/// Returns true when `ty` is one of `allowed`.
pub fn accepts(allowed: &[PgType], ty: PgType) -> bool {
    allowed.contains(&ty)
}

/// Binary payload width of fixed-size wire types.
pub fn fixed_size(ty: PgType) -> Option<usize> {
    match ty {
        PgType::Bool => Some(1),
        PgType::Int2 => Some(2),
        PgType::Int4 | PgType::Float4 | PgType::Date => Some(4),
        PgType::Int8 | PgType::Float8 | PgType::Time | PgType::Timestamp | PgType::Timestamptz => {
            Some(8)
        }
        PgType::Uuid => Some(16),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_types_cover_numeric_but_borrowed_do_not() {
        assert!(accepts(TEXT_TYPES, PgType::Numeric));
        assert!(!accepts(BORROWED_TEXT_TYPES, PgType::Numeric));
        assert!(accepts(BORROWED_TEXT_TYPES, PgType::Bpchar));
    }

    #[test]
    fn test_jsonb_is_not_text() {
        assert!(!accepts(TEXT_TYPES, PgType::Jsonb));
    }

    #[test]
    fn test_fixed_size() {
        assert_eq!(fixed_size(PgType::Int2), Some(2));
        assert_eq!(fixed_size(PgType::Date), Some(4));
        assert_eq!(fixed_size(PgType::Timestamptz), Some(8));
        assert_eq!(fixed_size(PgType::Uuid), Some(16));
        assert_eq!(fixed_size(PgType::Text), None);
    }
}
