//! Generic document view of a cell.
//!
//! Builds a `serde_json::Value` out of the typed decode paths so a row can be
//! rendered without knowing its column types up front.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::{Number, Value};
use uuid::Uuid;

use super::{Cell, PgType};
use crate::error::{TypeError, TypeResult};

fn float_value(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(number) => Value::Number(number),
        None => Value::String(value.to_string()),
    }
}

fn hex_value(data: &[u8]) -> Value {
    let mut out = String::with_capacity(2 + data.len() * 2);
    out.push_str("\\x");
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    Value::String(out)
}

fn infinite_or(is_max: bool, is_min: bool, finite: impl FnOnce() -> String) -> Value {
    if is_max {
        Value::String("infinity".to_string())
    } else if is_min {
        Value::String("-infinity".to_string())
    } else {
        Value::String(finite())
    }
}

impl Cell {
    /// Decode the cell into a generic JSON value.
    ///
    /// Numeric stays a string so no precision is lost; bytea renders in the
    /// server's `\x` hex form; text-format cells come back as their text.
    #[track_caller]
    pub fn to_document(&self) -> TypeResult<Value> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        if !self.is_binary() {
            return Ok(Value::String(self.get::<String>()?));
        }

        let doc = match self.pg_type() {
            PgType::Bool => Value::Bool(self.get::<bool>()?),
            PgType::Int2 => Value::from(self.get::<i16>()?),
            PgType::Int4 => Value::from(self.get::<i32>()?),
            PgType::Int8 => Value::from(self.get::<i64>()?),
            PgType::Float4 => float_value(self.get::<f32>()? as f64),
            PgType::Float8 => float_value(self.get::<f64>()?),
            PgType::Text | PgType::Varchar | PgType::Bpchar | PgType::Name | PgType::Numeric => {
                Value::String(self.get::<String>()?)
            }
            PgType::Json | PgType::Jsonb => self.get::<Value>()?,
            PgType::Bytea => hex_value(self.get::<&[u8]>()?),
            PgType::Uuid => Value::String(self.get::<Uuid>()?.to_string()),
            PgType::Date => {
                let date = self.get::<NaiveDate>()?;
                infinite_or(date == NaiveDate::MAX, date == NaiveDate::MIN, || date.to_string())
            }
            PgType::Time => {
                Value::String(self.get::<NaiveTime>()?.format("%H:%M:%S%.f").to_string())
            }
            PgType::Timestamp => {
                let ts = self.get::<NaiveDateTime>()?;
                infinite_or(ts == NaiveDateTime::MAX, ts == NaiveDateTime::MIN, || {
                    ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
                })
            }
            PgType::Timestamptz => {
                let ts = self.get::<DateTime<Utc>>()?;
                let naive = ts.naive_utc();
                infinite_or(naive == NaiveDateTime::MAX, naive == NaiveDateTime::MIN, || {
                    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
                })
            }
            PgType::Other(_) => {
                return Err(TypeError::not_implemented(self.pg_type(), "serde_json::Value"));
            }
        };
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{Format, Numeric, ToPg, oid};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(cell: Cell) -> Value {
        cell.to_document().unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(doc(true.to_pg()), json!(true));
        assert_eq!(doc((-5i16).to_pg()), json!(-5));
        assert_eq!(doc(7_000_000_000i64.to_pg()), json!(7_000_000_000i64));
        assert_eq!(doc(1.5f64.to_pg()), json!(1.5));
        assert_eq!(doc(f64::NAN.to_pg()), json!("NaN"));
        assert_eq!(doc("hi".to_pg()), json!("hi"));
    }

    #[test]
    fn test_numeric_stays_exact() {
        let n: Numeric = "12345678901234567890.120".parse().unwrap();
        assert_eq!(doc(n.to_pg()), json!("12345678901234567890.120"));
    }

    #[test]
    fn test_bytea_hex() {
        assert_eq!(doc(vec![0x00u8, 0xab, 0x10].to_pg()), json!("\\x00ab10"));
    }

    #[test]
    fn test_json_is_nested() {
        let cell = Cell::binary(PgType::Json, r#"{"a":[1,2]}"#);
        assert_eq!(doc(cell), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_temporal() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(doc(date.to_pg()), json!("2024-02-29"));
        assert_eq!(doc(NaiveDateTime::MAX.to_pg()), json!("infinity"));
        assert_eq!(doc(NaiveDate::MIN.to_pg()), json!("-infinity"));
        let ts = date.and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(doc(ts.to_pg()), json!("2024-02-29T08:30:00"));
        assert_eq!(doc(ts.and_utc().to_pg()), json!("2024-02-29T08:30:00Z"));
    }

    #[test]
    fn test_null_and_text_format() {
        assert_eq!(doc(Cell::null(PgType::Int4, Format::Binary)), Value::Null);
        assert_eq!(doc(Cell::text(PgType::Int4, "12")), json!("12"));
    }

    #[test]
    fn test_unsupported_types() {
        let jsonb = Cell::binary(PgType::Jsonb, b"\x01{}".to_vec());
        assert_eq!(jsonb.to_document().unwrap_err().kind(), ErrorKind::NotImplemented);
        let array = Cell::from_oid(oid::INT4_ARRAY, Format::Binary, Some(vec![0u8; 4].into()));
        let err = array.to_document().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        assert!(err.to_string().starts_with("cannot convert int4[] to"));
    }
}
