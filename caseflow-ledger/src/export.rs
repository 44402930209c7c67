//! CSV export of transactions

use chrono::SecondsFormat;
use thiserror::Error;

use crate::models::Transaction;

const HEADER: [&str; 8] = [
    "id",
    "fromAccount",
    "toAccount",
    "amount",
    "currency",
    "type",
    "timestamp",
    "status",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

/// Header plus one row per transaction, without a trailing newline.
/// No transactions means an empty string, not a lone header.
pub fn to_csv(transactions: &[Transaction]) -> Result<String, ExportError> {
    if transactions.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for t in transactions {
        let amount = t.amount.to_string();
        let timestamp = t.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        writer.write_record([
            t.id.as_str(),
            t.from_account.as_deref().unwrap_or(""),
            t.to_account.as_deref().unwrap_or(""),
            amount.as_str(),
            t.currency.code(),
            t.tx_type.as_str(),
            timestamp.as_str(),
            t.status.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
