//! Bulk import result types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::Ticket;

/// Supported import formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Json,
    Xml,
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Csv, FileType::Json, FileType::Xml];

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Json => "json",
            FileType::Xml => "xml",
        }
    }

    /// Match a filename extension, case-insensitively
    pub fn from_extension(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl FromStr for FileType {
    type Err = crate::services::ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FileType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| crate::services::ImportError::UnsupportedFileType(s.to_string()))
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected input record
///
/// `row` is 1-based within the document (CSV counts the header as row 1);
/// row 0 marks a document-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RowError {
    pub fn new(row: usize, error: impl Into<String>) -> Self {
        Self {
            row,
            error: error.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Aggregate outcome of one import call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
    pub tickets: Vec<Ticket>,
}

impl ImportResult {
    pub fn is_partial(&self) -> bool {
        self.successful > 0 && self.failed > 0
    }

    pub fn is_total_failure(&self) -> bool {
        self.successful == 0 && self.failed > 0
    }
}
