//! In-memory tabular data parsed from CSV downloads.

use std::str::FromStr;

use csv::ReaderBuilder;
use indexmap::IndexMap;

use crate::error::{ParseError, Result};

/// CSV parser configuration.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: b',').
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// A header row plus rows of string cells.
///
/// Every row has exactly `headers().len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, checking that every row matches the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|row| row.len() != headers.len()) {
            return Err(ParseError::ColumnCount {
                expected: headers.len(),
                found: bad.len(),
            }
            .into());
        }
        Ok(Self { headers, rows })
    }

    /// Parse CSV text.
    ///
    /// Without `column_names` the first row is the header. With them, every
    /// row is data and the given names become the header.
    pub fn from_csv(
        text: &str,
        column_names: Option<&[&str]>,
        options: &CsvOptions,
    ) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(column_names.is_none())
            .from_reader(text.as_bytes());

        let headers: Vec<String> = match column_names {
            Some(names) => names.iter().map(|n| n.to_string()).collect(),
            None => reader
                .headers()
                .map_err(ParseError::Csv)?
                .iter()
                .map(String::from)
                .collect(),
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(ParseError::Csv)?;
            rows.push(record.iter().map(String::from).collect());
        }

        Self::new(headers, rows)
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All values of one column.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// A single cell.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// A single cell parsed as `T`. `None` if missing or unparsable.
    pub fn get_parsed<T: FromStr>(&self, row: usize, column: &str) -> Option<T> {
        self.get(row, column)?.parse().ok()
    }

    /// Rows as column-name to value maps, in column order.
    pub fn records(&self) -> impl Iterator<Item = IndexMap<&str, &str>> + '_ {
        self.rows.iter().map(|row| {
            self.headers
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect()
        })
    }

    /// Replace the header names.
    pub fn rename_columns(&mut self, names: &[&str]) -> Result<()> {
        if names.len() != self.headers.len() {
            return Err(ParseError::ColumnCount {
                expected: self.headers.len(),
                found: names.len(),
            }
            .into());
        }
        self.headers = names.iter().map(|n| n.to_string()).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_header_row() {
        let table =
            Table::from_csv("id,amount,date\n1,10.5,2024-01-01\n", None, &CsvOptions::default())
                .unwrap();
        assert_eq!(table.headers(), ["id", "amount", "date"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "id"), Some("1"));
        assert_eq!(table.get(0, "amount"), Some("10.5"));
        assert_eq!(table.get(0, "date"), Some("2024-01-01"));
        assert_eq!(table.get_parsed::<f64>(0, "amount"), Some(10.5));
    }

    #[test]
    fn test_supplied_column_names() {
        let table = Table::from_csv(
            "1,Alice\n2,Bob",
            Some(&["id", "name"]),
            &CsvOptions::default(),
        )
        .unwrap();
        assert_eq!(table.headers(), ["id", "name"]);
        assert_eq!(table.column("name").unwrap(), vec!["Alice", "Bob"]);
        assert_eq!(table.get_parsed::<i64>(1, "id"), Some(2));
    }

    #[test]
    fn test_column_names_width_mismatch() {
        let err = Table::from_csv("1,Alice\n", Some(&["id"]), &CsvOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Table::from_csv("a,b\n1,2\n3\n", None, &CsvOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_semicolon_and_bom() {
        let options = CsvOptions { delimiter: b';' };
        let table = Table::from_csv("\u{feff}id;name\n7;\"Smith; J\"\n", None, &options).unwrap();
        assert_eq!(table.headers(), ["id", "name"]);
        assert_eq!(table.get(0, "name"), Some("Smith; J"));
    }

    #[test]
    fn test_records_keep_column_order() {
        let table =
            Table::from_csv("z,a\n1,2\n", None, &CsvOptions::default()).unwrap();
        let record = table.records().next().unwrap();
        let keys: Vec<&str> = record.keys().copied().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(record["a"], "2");
    }

    #[test]
    fn test_rename_columns() {
        let mut table =
            Table::from_csv("id,amount\n1,2\n", None, &CsvOptions::default()).unwrap();
        table.rename_columns(&["a", "b"]).unwrap();
        assert_eq!(table.headers(), ["a", "b"]);
        assert!(table.rename_columns(&["only"]).is_err());
    }

    #[test]
    fn test_empty_input() {
        let table = Table::from_csv("", None, &CsvOptions::default()).unwrap();
        assert!(table.is_empty());
        assert!(table.headers().is_empty());
    }
}
