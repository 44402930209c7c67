//! Bulk import orchestration
//!
//! An import runs in two phases. [`Importer::prepare`] parses, validates and classifies
//! without touching the store, so the HTTP layer can do that work before it takes the write
//! lock. [`PreparedImport::commit`] then stores every ready ticket under one `&mut` borrow.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{FileType, ImportResult, RowError, Ticket};
use crate::parsers::{parser_for, ParsedTicket};
use crate::services::classifier::classify;
use crate::store::TicketStore;

/// Import configuration for one call
#[derive(Debug, Clone, Copy)]
pub struct Importer {
    file_type: FileType,
    auto_classify: bool,
}

impl Importer {
    pub fn new(file_type: FileType, auto_classify: bool) -> Self {
        Self {
            file_type,
            auto_classify,
        }
    }

    /// Parse and classify `content`; the store is not touched
    pub fn prepare(&self, content: &str) -> PreparedImport {
        let outcome = parser_for(self.file_type).parse(content);
        let tickets = outcome
            .records
            .into_iter()
            .map(|record| self.build_ticket(record))
            .collect();

        PreparedImport {
            file_type: self.file_type,
            tickets,
            errors: outcome.errors,
        }
    }

    /// Parse, classify and store in one go
    pub fn import(&self, store: &mut TicketStore, content: &str) -> ImportResult {
        self.prepare(content).commit(store)
    }

    fn build_ticket(&self, record: ParsedTicket) -> Ticket {
        let mut category = record.category;
        let mut priority = record.priority;
        let mut classification = None;

        if self.auto_classify || category.is_none() || priority.is_none() {
            let result = classify(&record.subject, &record.description);
            category.get_or_insert(result.category);
            priority.get_or_insert(result.priority);
            classification = Some(result.to_ticket_data());
        }

        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4().to_string(),
            customer_id: record.customer_id,
            customer_email: record.customer_email,
            customer_name: record.customer_name,
            subject: record.subject,
            description: record.description,
            category: category.unwrap_or_default(),
            priority: priority.unwrap_or_default(),
            status: record.status,
            created_at: record.created_at.unwrap_or(now),
            updated_at: record.updated_at.unwrap_or(now),
            resolved_at: None,
            assigned_to: record.assigned_to,
            tags: record.tags,
            metadata: record.metadata,
            classification,
        }
    }
}

/// Tickets ready to store plus the rows already rejected by the parser
#[derive(Debug)]
pub struct PreparedImport {
    file_type: FileType,
    tickets: Vec<Ticket>,
    errors: Vec<RowError>,
}

impl PreparedImport {
    /// Store every ticket; a store failure becomes a row error and the batch continues
    pub fn commit(self, store: &mut TicketStore) -> ImportResult {
        let mut stored = Vec::with_capacity(self.tickets.len());
        let mut errors = self.errors;

        for ticket in self.tickets {
            let row = stored.len() + errors.len() + 1;
            let data = serde_json::to_value(&ticket).ok();
            match store.create_with_id(ticket) {
                Ok(ticket) => stored.push(ticket),
                Err(e) => {
                    warn!(row, error = %e, "Failed to store imported ticket");
                    let error = RowError::new(row, e.to_string());
                    errors.push(match data {
                        Some(data) => error.with_data(data),
                        None => error,
                    });
                }
            }
        }

        let result = ImportResult {
            total: stored.len() + errors.len(),
            successful: stored.len(),
            failed: errors.len(),
            errors,
            tickets: stored,
        };

        info!(
            file_type = %self.file_type,
            total = result.total,
            successful = result.successful,
            failed = result.failed,
            "Import completed"
        );
        result
    }
}

/// Format from the filename extension, else from the leading content
pub fn detect_file_type(content: &str, filename: Option<&str>) -> FileType {
    if let Some(file_type) = filename.and_then(FileType::from_extension) {
        return file_type;
    }

    let head = content.trim_start_matches('\u{feff}').trim_start();
    if head.starts_with('{') || head.starts_with('[') {
        FileType::Json
    } else if head.starts_with("<?xml") || head.starts_with("<tickets") {
        FileType::Xml
    } else {
        FileType::Csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority};

    const HEADER: &str =
        "customer_id,customer_email,customer_name,subject,description,category,priority";

    fn csv(rows: &[&str]) -> String {
        let mut content = HEADER.to_string();
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content
    }

    #[test]
    fn header_only_csv_imports_nothing() {
        let mut store = TicketStore::new();
        let result = Importer::new(FileType::Csv, false).import(&mut store, HEADER);
        assert_eq!(result.total, 0);
        assert_eq!(result.successful, 0);
        assert_eq!(result.failed, 0);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn missing_required_field_is_one_error_at_its_row() {
        let mut store = TicketStore::new();
        let content = csv(&[
            "C1,a@example.com,Ann,Subject,Long enough description,other,low",
            "C2,b@example.com,,Subject,Long enough description,other,low",
            "C3,c@example.com,Cid,Subject,Long enough description,other,low",
        ]);
        let result = Importer::new(FileType::Csv, false).import(&mut store, &content);
        assert_eq!(result.total, 3);
        assert_eq!(result.successful, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors[0].row, 3);
        assert!(result.errors[0].error.contains("customer_name"));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn explicit_values_skip_classification() {
        let mut store = TicketStore::new();
        let content = csv(&[
            "C1,a@example.com,Ann,Cannot login,I forgot my password again,other,low",
        ]);
        let result = Importer::new(FileType::Csv, false).import(&mut store, &content);
        let ticket = &result.tickets[0];
        assert_eq!(ticket.category, Category::Other);
        assert_eq!(ticket.priority, Priority::Low);
        assert!(ticket.classification.is_none());
    }

    #[test]
    fn classification_fills_only_missing_fields() {
        let mut store = TicketStore::new();
        let content = csv(&["C1,a@example.com,Ann,Cannot login,I forgot my password again,,low"]);
        let result = Importer::new(FileType::Csv, false).import(&mut store, &content);
        let ticket = &result.tickets[0];
        assert_eq!(ticket.category, Category::AccountAccess);
        assert_eq!(ticket.priority, Priority::Low);
        let classification = ticket.classification.as_ref().unwrap();
        assert!(!classification.manually_classified);
        assert!(classification.keywords.contains(&"login".to_string()));
    }

    #[test]
    fn auto_classify_keeps_explicit_values_but_attaches_classification() {
        let mut store = TicketStore::new();
        let content = csv(&[
            "C1,a@example.com,Ann,Cannot login,I forgot my password again,other,low",
        ]);
        let result = Importer::new(FileType::Csv, true).import(&mut store, &content);
        let ticket = &result.tickets[0];
        assert_eq!(ticket.category, Category::Other);
        assert!(ticket.classification.is_some());
    }

    #[test]
    fn store_failures_become_row_errors() {
        let mut store = TicketStore::with_capacity_limit(Some(1));
        let content = csv(&[
            "C1,a@example.com,Ann,Subject,Long enough description,other,low",
            "C2,bad-email,Bob,Subject,Long enough description,other,low",
            "C3,c@example.com,Cid,Subject,Long enough description,other,low",
        ]);
        let result = Importer::new(FileType::Csv, false).import(&mut store, &content);
        assert_eq!(result.successful, 1);
        assert_eq!(result.failed, 2);
        // parse error already recorded, so the rejected C3 is counted after it
        assert_eq!(result.errors[1].row, 3);
        assert!(result.errors[1].error.contains("full"));
        assert_eq!(result.errors[1].data.as_ref().unwrap()["customer_id"], "C3");
        assert!(result.is_partial());
    }

    #[test]
    fn timestamps_from_the_record_are_kept() {
        let mut store = TicketStore::new();
        let content = r#"[{"customer_id": "C1", "customer_email": "a@example.com",
            "customer_name": "Ann", "subject": "Hi", "description": "Long enough description",
            "category": "other", "priority": "low", "created_at": "2024-03-01"}]"#;
        let result = Importer::new(FileType::Json, false).import(&mut store, content);
        let ticket = &result.tickets[0];
        assert_eq!(ticket.created_at.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn document_error_is_a_failed_import() {
        let mut store = TicketStore::new();
        let result = Importer::new(FileType::Json, false).import(&mut store, "{}");
        assert_eq!(result.total, 1);
        assert!(result.is_total_failure());
        assert_eq!(result.errors[0].row, 0);
    }

    #[test]
    fn detection_prefers_extension_then_content() {
        assert_eq!(detect_file_type("[]", Some("tickets.CSV")), FileType::Csv);
        assert_eq!(detect_file_type("  [{}]", None), FileType::Json);
        assert_eq!(detect_file_type("{}", Some("noext")), FileType::Json);
        assert_eq!(detect_file_type("<?xml version=\"1.0\"?>", None), FileType::Xml);
        assert_eq!(detect_file_type("<tickets/>", None), FileType::Xml);
        assert_eq!(detect_file_type("customer_id,subject", None), FileType::Csv);
    }
}
