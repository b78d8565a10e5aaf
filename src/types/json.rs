//! JSON codecs.
//!
//! `json` cells carry the document as plain UTF-8 text. `jsonb` uses a
//! version-tagged binary layout that is not decoded here: asking for a
//! document from a jsonb cell is a `NotImplemented` error, never a guess.
//! Callers wanting jsonb documents cast to json in the query or read the
//! text format.

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Cell, FromPg, PgType, ToPg, non_null};
use crate::error::{TypeError, TypeResult};

/// Typed JSON document, deserialized with serde.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Text of a binary json cell.
fn json_payload<'a>(cell: &'a Cell, expected: &'static str) -> TypeResult<&'a [u8]> {
    let data = non_null(cell, expected)?;
    if !cell.is_binary() {
        return Err(TypeError::not_binary(cell.pg_type(), expected));
    }
    match cell.pg_type() {
        PgType::Json => Ok(data),
        PgType::Jsonb => {
            tracing::warn!(
                expected,
                len = data.len(),
                "binary jsonb decoding is not supported; request json or text format"
            );
            Err(TypeError::not_implemented(PgType::Jsonb, expected))
        }
        other => Err(TypeError::not_implemented(other, expected)),
    }
}

impl<'a> FromPg<'a> for Value {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = json_payload(cell, "serde_json::Value")?;
        match serde_json::from_slice(data) {
            Ok(doc) => Ok(doc),
            Err(err) => {
                Err(TypeError::invalid_data(PgType::Json, "serde_json::Value", err.to_string()))
            }
        }
    }
}

impl<'a, T: DeserializeOwned> FromPg<'a> for Json<T> {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = json_payload(cell, "Json<T>")?;
        match serde_json::from_slice(data) {
            Ok(doc) => Ok(Json(doc)),
            Err(err) => Err(TypeError::invalid_data(PgType::Json, "Json<T>", err.to_string())),
        }
    }
}

impl ToPg for Value {
    const PG_TYPE: PgType = PgType::Json;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_slice(self.to_string().as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_json_matches_text_parse() {
        let cell = Cell::binary(PgType::Json, r#"{"a":1}"#);
        let doc: Value = cell.get().unwrap();
        assert_eq!(doc, serde_json::from_str::<Value>(r#"{"a":1}"#).unwrap());
    }

    #[test]
    fn test_jsonb_is_not_implemented() {
        // version byte 1 followed by text, as a server would send it
        let cell = Cell::binary(PgType::Jsonb, b"\x01{\"a\":1}".to_vec());
        let err = cell.get::<Value>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        assert_eq!(err.pg_type(), PgType::Jsonb);
    }

    #[test]
    fn test_json_requires_binary() {
        let cell = Cell::text(PgType::Json, "{}");
        assert_eq!(cell.get::<Value>().unwrap_err().kind(), ErrorKind::NotBinary);
    }

    #[test]
    fn test_json_from_text_type() {
        let cell = Cell::binary(PgType::Text, "{}");
        assert_eq!(cell.get::<Value>().unwrap_err().kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn test_invalid_json() {
        let cell = Cell::binary(PgType::Json, "{not json");
        assert_eq!(cell.get::<Value>().unwrap_err().kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_typed_json() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        let cell = Cell::binary(PgType::Json, r#"{"x":3,"y":-4}"#);
        let Json(point) = cell.get::<Json<Point>>().unwrap();
        assert_eq!(point, Point { x: 3, y: -4 });
    }

    #[test]
    fn test_encode_value() {
        let doc = json!({"tags": ["a", "b"], "n": 1});
        let cell = doc.to_pg();
        assert_eq!(cell.pg_type(), PgType::Json);
        assert_eq!(cell.get::<Value>().unwrap(), doc);
    }
}
