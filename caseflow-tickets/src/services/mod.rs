//! Ticket services: classification and bulk import

pub mod classifier;
pub mod importer;

use thiserror::Error;

pub use classifier::{classify, Classification};
pub use importer::{detect_file_type, Importer, PreparedImport};

/// Failures that reject a whole import call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Invalid file type. Must be one of: csv, json, xml")]
    UnsupportedFileType(String),
}
