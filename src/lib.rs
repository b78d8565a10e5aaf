//! QAIL Codec
//!
//! Typed conversion between PostgreSQL binary wire values and Rust types.
//!
//! # Architecture
//!
//! Pure, synchronous computation - no I/O, no async, no shared mutable state.
//! The connection layer hands over a [`Cell`] (type OID + format + payload);
//! this crate validates it and produces the native value, or the reverse for
//! query parameters.
//!
//! - [`FromPg`] / [`Cell::get`] - decode with format, type and size checks
//! - [`ToPg`] / [`encode`] - encode with the registered wire type
//! - [`Numeric`] - exact decimal text for `numeric`
//! - [`Params`] - ordered query parameters with their types and formats
//!
//! # Example
//!
//! ```
//! use qail_codec::{Cell, Numeric, PgType, ToPg};
//!
//! let cell = Cell::binary(PgType::Bool, vec![0x01]);
//! assert!(cell.get::<bool>().unwrap());
//!
//! let price: Numeric = "7.0".parse().unwrap();
//! let cell = price.to_pg();
//! assert_eq!(cell.get::<String>().unwrap(), "7.0");
//! ```

pub mod error;
pub mod params;
pub mod types;

pub use error::{ErrorKind, TypeError, TypeResult};
pub use params::Params;
pub use types::{
    Cell, Format, FromPg, Json, Numeric, PgType, ToPg, array_element, decode, encode, encode_with,
    oid,
};
