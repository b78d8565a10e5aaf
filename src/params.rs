//! Query parameters built from encoded cells.
//!
//! Provides `Params` and the `params!` macro for ordered positional binding.
//! The connection layer reads types, formats and payloads from here when it
//! builds Parse and Bind messages.

use crate::types::{Cell, Format, PgType, ToPg};

/// Ordered positional parameters ($1, $2, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    cells: Vec<Cell>,
}

impl Params {
    /// Create empty params.
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Append a value in binary format.
    pub fn push<T: ToPg + ?Sized>(&mut self, value: &T) -> &mut Self {
        self.cells.push(value.to_pg());
        self
    }

    /// Append a value, requesting `format` where the type supports it.
    pub fn push_with<T: ToPg + ?Sized>(&mut self, value: &T, format: Format) -> &mut Self {
        self.cells.push(value.to_pg_with(format));
        self
    }

    /// Append a typed NULL.
    pub fn push_null(&mut self, pg_type: PgType) -> &mut Self {
        self.cells.push(Cell::null(pg_type, Format::Binary));
        self
    }

    /// Append an already-encoded cell.
    pub fn push_cell(&mut self, cell: Cell) -> &mut Self {
        self.cells.push(cell);
        self
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get a parameter by zero-based position.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Parameter type OIDs for a Parse message.
    pub fn type_oids(&self) -> Vec<u32> {
        self.cells.iter().map(Cell::oid).collect()
    }

    /// Per-parameter format codes for a Bind message.
    pub fn format_codes(&self) -> Vec<i16> {
        self.cells.iter().map(|c| c.format().code()).collect()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl FromIterator<Cell> for Params {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self { cells: iter.into_iter().collect() }
    }
}

/// Convenience macro for creating Params.
///
/// # Example
/// ```
/// use qail_codec::params;
///
/// let user_id = 42i64;
/// let params = params![user_id, "active", 10i32];
/// assert_eq!(params.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    ($($value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut params = $crate::params::Params::new();
        $(
            params.push(&$value);
        )*
        params
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::oid;

    #[test]
    fn test_push_chain() {
        let mut params = Params::new();
        params.push(&42i64).push("test").push_null(PgType::Uuid);

        assert_eq!(params.len(), 3);
        assert_eq!(params.get(0).unwrap().get::<i64>().unwrap(), 42);
        assert_eq!(params.get(1).unwrap().get::<&str>().unwrap(), "test");
        assert!(params.get(2).unwrap().is_null());
        assert_eq!(params.type_oids(), vec![oid::INT8, oid::TEXT, oid::UUID]);
    }

    #[test]
    fn test_macro_ordering() {
        let params = crate::params![1i32, 2i16, true];
        assert_eq!(params.type_oids(), vec![oid::INT4, oid::INT2, oid::BOOL]);
        assert_eq!(params.format_codes(), vec![1, 1, 1]);
    }

    #[test]
    fn test_text_parameter_keeps_terminator() {
        let mut params = Params::new();
        params.push_with("hi", Format::Text).push_with(&5i16, Format::Text);
        assert_eq!(params.get(0).unwrap().payload(), b"hi\0");
        // only text-like types honor the text format
        assert_eq!(params.format_codes(), vec![0, 1]);
    }

    #[test]
    fn test_collect_cells() {
        let params: Params = [1i64.to_pg(), Cell::null(PgType::Bool, Format::Binary)]
            .into_iter()
            .collect();
        let oids: Vec<u32> = params.iter().map(Cell::oid).collect();
        assert_eq!(oids, params.type_oids());
        assert_eq!((&params).into_iter().filter(|c| c.is_null()).count(), 1);
    }

    #[test]
    fn test_empty_params() {
        let params = crate::params![];
        assert!(params.is_empty());
        assert!(params.type_oids().is_empty());
    }
}
