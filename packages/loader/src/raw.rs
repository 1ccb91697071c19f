//! Untyped tabular input.
//!
//! A [`RawTable`] is the housing file exactly as read: a header row and
//! string cells. Header spelling is left untouched here; mapping to
//! canonical columns happens in [`crate::normalize`].

use std::io::Read;
use std::path::Path;

use crate::LoaderError;

/// A header row plus string cells. Empty cells represent nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Reads a comma-delimited table with a header row.
    ///
    /// Headers and cells are trimmed. Short rows are allowed; their missing
    /// trailing cells read as empty.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError`] if the CSV is malformed or has no header.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, LoaderError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(LoaderError::Schema {
                column: "<header row>".to_owned(),
            });
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|c| c.trim().to_owned()).collect());
        }

        log::debug!("Read {} rows x {} columns", rows.len(), headers.len());

        Ok(Self { headers, rows })
    }

    /// Opens and reads a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError`] if the file cannot be opened or parsed.
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    /// Returns the header names as read.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns all rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Returns a cell, or `None` when it is absent or blank.
#[must_use]
pub fn cell(row: &[String], index: usize) -> Option<&str> {
    row.get(index).map(String::as_str).filter(|c| !c.is_empty())
}
