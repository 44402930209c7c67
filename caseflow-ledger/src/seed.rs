//! Startup seeding from a `{ "sampleTransactions": [...] }` JSON file
//!
//! Entries go through the same validation as POST /transactions; invalid ones are skipped.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::TransactionStore;
use crate::validation::{validate_transaction, TransactionRequest};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedFile {
    #[serde(default)]
    sample_transactions: Vec<TransactionRequest>,
}

/// Load `path` into `store`; returns how many transactions were created
pub fn seed_from_file(store: &mut TransactionStore, path: &Path) -> Result<usize, SeedError> {
    let content = std::fs::read_to_string(path)?;
    let seed: SeedFile = serde_json::from_str(&content)?;

    let mut created = 0;
    for (index, request) in seed.sample_transactions.iter().enumerate() {
        match validate_transaction(request) {
            Ok(new) => {
                store.create(new);
                created += 1;
            }
            Err(errors) => warn!(
                entry = index,
                errors = ?errors,
                "Skipping invalid sample transaction"
            ),
        }
    }

    info!(path = %path.display(), created, "Seeded sample transactions");
    Ok(created)
}
