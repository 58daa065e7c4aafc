use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::CellValue;

/// One body row of an inferred table, addressable by header name.
///
/// Fields iterate in header order. The header list is shared between all records of the
/// same table.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    headers: Arc<[String]>,
    values: Vec<CellValue>,
}

impl Record {
    /// Create a record. `values` is padded with [`CellValue::Empty`] (or truncated) to the
    /// header count so every record has exactly one value per header.
    pub fn new(headers: Arc<[String]>, mut values: Vec<CellValue>) -> Self {
        values.resize(headers.len(), CellValue::Empty);
        Self { headers, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<CellValue> {
        self.values
    }

    /// Value at header position `idx`.
    pub fn value(&self, idx: usize) -> Option<&CellValue> {
        self.values.get(idx)
    }

    /// Value of the field named `name` (exact match).
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        let idx = self.headers.iter().position(|h| h == name)?;
        self.values.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> + '_ {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A table recovered from a raw grid, plus the parser decisions that produced it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InferredTable {
    /// Unique column names, in left-to-right order of the retained source columns.
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
    /// Index (0-based, into the raw grid) of the row that supplied the headers.
    pub header_row_index: usize,
    /// Body rows dropped by footer trimming.
    pub trimmed_footer_rows: usize,
}

impl InferredTable {
    /// Build a table from headers and positional rows. Each row is padded/truncated to the
    /// header count.
    pub fn from_parts(
        headers: Vec<String>,
        rows: Vec<Vec<CellValue>>,
        header_row_index: usize,
        trimmed_footer_rows: usize,
    ) -> Self {
        let shared: Arc<[String]> = Arc::from(headers.clone());
        let rows = rows
            .into_iter()
            .map(|values| Record::new(shared.clone(), values))
            .collect();
        Self {
            headers,
            rows,
            header_row_index,
            trimmed_footer_rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Iterate the values of column `idx` across all rows.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |r| r.value(idx))
    }

    /// Iterate the values of the column named `name`; yields nothing for unknown names.
    pub fn column_by_name<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CellValue> + 'a {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |r| idx.and_then(|i| r.value(i)))
    }
}
