//! Zero-padded five-digit ZIP codes.
//!
//! Source data stores ZIP codes as integers, which silently turns New
//! England codes like `02134` into `2134`. [`ZipCode`] always renders as a
//! five-character string so it lines up with ZCTA polygon keys.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of characters in a rendered ZIP code.
pub const ZIP_LEN: usize = 5;

/// A five-character, zero-padded ZIP code (e.g. `"02134"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    /// Parses a raw ZIP value from a table cell.
    ///
    /// Accepts numeric renderings (`"2134"`, `"2134.0"`), padded strings
    /// (`"02134"`), surrounding whitespace, and ZIP+4 suffixes
    /// (`"02134-1234"`). Returns `None` for empty or non-numeric input and
    /// for values longer than five digits.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let base = trimmed.split('-').next().unwrap_or(trimmed);
        let digits = base.strip_suffix(".0").unwrap_or(base);

        if digits.is_empty() || digits.len() > ZIP_LEN || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        Some(Self(format!("{digits:0>ZIP_LEN$}")))
    }

    /// Builds a ZIP code from its integer form, restoring leading zeros.
    ///
    /// Returns `None` if the number has more than five digits.
    #[must_use]
    pub fn from_number(value: u32) -> Option<Self> {
        if value > 99_999 {
            return None;
        }
        Some(Self(format!("{value:05}")))
    }

    /// Returns the padded string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ZipCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when a value cannot be interpreted as a ZIP code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidZipError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidZipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid ZIP code '{}': expected up to 5 digits", self.value)
    }
}

impl std::error::Error for InvalidZipError {}

impl FromStr for ZipCode {
    type Err = InvalidZipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidZipError {
            value: s.to_string(),
        })
    }
}

impl TryFrom<String> for ZipCode {
    type Error = InvalidZipError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ZipCode> for String {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}
