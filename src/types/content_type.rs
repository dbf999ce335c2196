//! On-disk encodings a delta file may use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The encoding of a single delta file, as recorded in its manifest entry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentType {
    #[serde(rename = "text/csv")]
    Csv,
    #[serde(rename = "application/parquet")]
    Parquet,
    /// Arrow IPC file format.
    #[serde(rename = "application/feather")]
    Feather,
    #[serde(rename = "application/json")]
    Json,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Csv,
        ContentType::Parquet,
        ContentType::Feather,
        ContentType::Json,
    ];

    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentType::Csv => "text/csv",
            ContentType::Parquet => "application/parquet",
            ContentType::Feather => "application/feather",
            ContentType::Json => "application/json",
        }
    }

    /// Row-oriented encodings whose files carry no column names of their own.
    pub fn is_headerless_text(&self) -> bool {
        matches!(self, ContentType::Csv)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}
