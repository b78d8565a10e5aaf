//! Wire type identifiers: OIDs and the `PgType` tag cells carry.
//!
//! Reference: https://github.com/postgres/postgres/blob/master/src/include/catalog/pg_type.dat

use std::fmt;

/// Built-in type OIDs as sent in RowDescription and Parse.
pub mod oid {
    // Boolean
    pub const BOOL: u32 = 16;

    // Bytes
    pub const BYTEA: u32 = 17;

    // Characters
    pub const NAME: u32 = 19;

    // Integers
    pub const INT8: u32 = 20; // bigint
    pub const INT2: u32 = 21; // smallint
    pub const INT4: u32 = 23; // integer

    // Text
    pub const TEXT: u32 = 25;
    pub const VARCHAR: u32 = 1043;
    pub const BPCHAR: u32 = 1042; // blank-padded char

    // JSON
    pub const JSON: u32 = 114;
    pub const JSONB: u32 = 3802;

    // Float
    pub const FLOAT4: u32 = 700;
    pub const FLOAT8: u32 = 701;

    // Numeric
    pub const NUMERIC: u32 = 1700;

    // Date/Time
    pub const DATE: u32 = 1082;
    pub const TIME: u32 = 1083;
    pub const TIMESTAMP: u32 = 1114;
    pub const TIMESTAMPTZ: u32 = 1184;

    // UUID
    pub const UUID: u32 = 2950;

    // Arrays (defined separately in pg_type, not always element OID + 1)
    pub const BOOL_ARRAY: u32 = 1000;
    pub const INT2_ARRAY: u32 = 1005;
    pub const INT4_ARRAY: u32 = 1007;
    pub const INT8_ARRAY: u32 = 1016;
    pub const TEXT_ARRAY: u32 = 1009;
    pub const VARCHAR_ARRAY: u32 = 1015;
    pub const FLOAT4_ARRAY: u32 = 1021;
    pub const FLOAT8_ARRAY: u32 = 1022;
    pub const UUID_ARRAY: u32 = 2951;
    pub const JSONB_ARRAY: u32 = 3807;
}

/// Server-side type tag carried by every cell.
///
/// OIDs without a codec map to `Other` so cells of any type can still be
/// held, inspected and rejected with a typed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PgType {
    Bool,
    Bytea,
    Name,
    Int2,
    Int4,
    Int8,
    Text,
    Varchar,
    Bpchar,
    Json,
    Jsonb,
    Float4,
    Float8,
    Numeric,
    Date,
    Time,
    Timestamp,
    Timestamptz,
    Uuid,
    Other(u32),
}

impl PgType {
    pub fn from_oid(value: u32) -> Self {
        match value {
            oid::BOOL => PgType::Bool,
            oid::BYTEA => PgType::Bytea,
            oid::NAME => PgType::Name,
            oid::INT2 => PgType::Int2,
            oid::INT4 => PgType::Int4,
            oid::INT8 => PgType::Int8,
            oid::TEXT => PgType::Text,
            oid::VARCHAR => PgType::Varchar,
            oid::BPCHAR => PgType::Bpchar,
            oid::JSON => PgType::Json,
            oid::JSONB => PgType::Jsonb,
            oid::FLOAT4 => PgType::Float4,
            oid::FLOAT8 => PgType::Float8,
            oid::NUMERIC => PgType::Numeric,
            oid::DATE => PgType::Date,
            oid::TIME => PgType::Time,
            oid::TIMESTAMP => PgType::Timestamp,
            oid::TIMESTAMPTZ => PgType::Timestamptz,
            oid::UUID => PgType::Uuid,
            other => PgType::Other(other),
        }
    }

    pub fn oid(self) -> u32 {
        match self {
            PgType::Bool => oid::BOOL,
            PgType::Bytea => oid::BYTEA,
            PgType::Name => oid::NAME,
            PgType::Int2 => oid::INT2,
            PgType::Int4 => oid::INT4,
            PgType::Int8 => oid::INT8,
            PgType::Text => oid::TEXT,
            PgType::Varchar => oid::VARCHAR,
            PgType::Bpchar => oid::BPCHAR,
            PgType::Json => oid::JSON,
            PgType::Jsonb => oid::JSONB,
            PgType::Float4 => oid::FLOAT4,
            PgType::Float8 => oid::FLOAT8,
            PgType::Numeric => oid::NUMERIC,
            PgType::Date => oid::DATE,
            PgType::Time => oid::TIME,
            PgType::Timestamp => oid::TIMESTAMP,
            PgType::Timestamptz => oid::TIMESTAMPTZ,
            PgType::Uuid => oid::UUID,
            PgType::Other(value) => value,
        }
    }

    /// `pg_type.typname` of the tag, `"unknown"` for `Other`.
    pub fn name(self) -> &'static str {
        match self {
            PgType::Bool => "bool",
            PgType::Bytea => "bytea",
            PgType::Name => "name",
            PgType::Int2 => "int2",
            PgType::Int4 => "int4",
            PgType::Int8 => "int8",
            PgType::Text => "text",
            PgType::Varchar => "varchar",
            PgType::Bpchar => "bpchar",
            PgType::Json => "json",
            PgType::Jsonb => "jsonb",
            PgType::Float4 => "float4",
            PgType::Float8 => "float8",
            PgType::Numeric => "numeric",
            PgType::Date => "date",
            PgType::Time => "time",
            PgType::Timestamp => "timestamp",
            PgType::Timestamptz => "timestamptz",
            PgType::Uuid => "uuid",
            PgType::Other(_) => "unknown",
        }
    }
}

impl From<u32> for PgType {
    fn from(value: u32) -> Self {
        PgType::from_oid(value)
    }
}

/// Errors about array cells read as `int4[]` rather than a bare OID.
impl fmt::Display for PgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PgType::Other(code) => match array_element(code) {
                Some(element) => write!(f, "{}[]", element.name()),
                None => write!(f, "oid {code}"),
            },
            known => f.write_str(known.name()),
        }
    }
}

/// Element type of a built-in one-dimensional array OID.
///
/// Array cells have no scalar codec and stay `PgType::Other`; this lets the
/// caller route them to an array traversal layer.
pub fn array_element(code: u32) -> Option<PgType> {
    let element = match code {
        oid::BOOL_ARRAY => PgType::Bool,
        oid::INT2_ARRAY => PgType::Int2,
        oid::INT4_ARRAY => PgType::Int4,
        oid::INT8_ARRAY => PgType::Int8,
        oid::TEXT_ARRAY => PgType::Text,
        oid::VARCHAR_ARRAY => PgType::Varchar,
        oid::FLOAT4_ARRAY => PgType::Float4,
        oid::FLOAT8_ARRAY => PgType::Float8,
        oid::UUID_ARRAY => PgType::Uuid,
        oid::JSONB_ARRAY => PgType::Jsonb,
        _ => return None,
    };
    Some(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_through_oids() {
        for ty in [PgType::Bool, PgType::Name, PgType::Int8, PgType::Bpchar, PgType::Jsonb] {
            assert_eq!(PgType::from_oid(ty.oid()), ty);
        }
        assert_eq!(PgType::from(oid::TIMESTAMPTZ), PgType::Timestamptz);
        assert_eq!(PgType::Other(9999).oid(), 9999);
        assert_eq!(PgType::Other(9999).name(), "unknown");
    }

    #[test]
    fn test_arrays_stay_other_with_element() {
        let array = PgType::from_oid(oid::FLOAT8_ARRAY);
        assert_eq!(array, PgType::Other(oid::FLOAT8_ARRAY));
        assert_eq!(array_element(oid::FLOAT8_ARRAY), Some(PgType::Float8));
        assert_eq!(array_element(oid::JSONB_ARRAY), Some(PgType::Jsonb));
        assert_eq!(array_element(oid::BYTEA), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PgType::Float8.to_string(), "float8");
        assert_eq!(PgType::Other(oid::TEXT_ARRAY).to_string(), "text[]");
        assert_eq!(PgType::Other(4242).to_string(), "oid 4242");
    }
}
