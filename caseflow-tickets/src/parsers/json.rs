//! JSON import: the document must be an array of ticket objects

use serde_json::Value;
use tracing::debug;

use super::{validate_record, ParseOutcome, TicketParser};
use crate::models::RowError;

pub struct JsonParser;

impl TicketParser for JsonParser {
    fn parse(&self, content: &str) -> ParseOutcome {
        let document: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(e) => return ParseOutcome::document_error(format!("JSON parsing failed: {}", e)),
        };

        let Value::Array(items) = document else {
            return ParseOutcome::document_error("JSON must be an array of ticket objects");
        };

        let mut outcome = ParseOutcome::default();
        for (index, item) in items.into_iter().enumerate() {
            let row = index + 1;
            match item {
                Value::Object(map) => validate_record(row, map, &mut outcome),
                other => outcome.errors.push(
                    RowError::new(row, "Ticket entry must be an object").with_data(other),
                ),
            }
        }

        debug!(
            records = outcome.records.len(),
            errors = outcome.errors.len(),
            "Parsed JSON"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeviceType, Source, Status};

    #[test]
    fn array_of_tickets() {
        let content = r#"[
            {
                "customerId": "C1",
                "customerEmail": "a@example.com",
                "customerName": "Ann",
                "subject": "Refund",
                "description": "Please refund my last invoice",
                "status": "in_progress",
                "tags": ["billing"],
                "metadata": {"source": "email", "device_type": "tablet"}
            }
        ]"#;
        let outcome = JsonParser.parse(content);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let ticket = &outcome.records[0];
        assert_eq!(ticket.status, Status::InProgress);
        assert_eq!(ticket.tags, vec!["billing"]);
        assert_eq!(ticket.metadata.source, Source::Email);
        assert_eq!(ticket.metadata.device_type, DeviceType::Tablet);
    }

    #[test]
    fn rows_are_one_based() {
        let content = r#"[
            {"customer_id": "C1", "customer_email": "a@example.com", "customer_name": "Ann",
             "subject": "One", "description": "Long enough description"},
            {"customer_id": "C2", "customer_email": "b@example.com", "customer_name": "Bob",
             "description": "Long enough description"}
        ]"#;
        let outcome = JsonParser.parse(content);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 2);
        assert!(outcome.errors[0].error.contains("subject"));
    }

    #[test]
    fn non_array_root_is_a_document_error() {
        let outcome = JsonParser.parse(r#"{"tickets": []}"#);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 0);
        assert_eq!(outcome.errors[0].error, "JSON must be an array of ticket objects");
    }

    #[test]
    fn malformed_json_is_a_document_error() {
        let outcome = JsonParser.parse("[{\"customer_id\": ");
        assert_eq!(outcome.errors[0].row, 0);
        assert!(outcome.errors[0].error.starts_with("JSON parsing failed"));
    }

    #[test]
    fn non_object_entries_are_row_errors() {
        let outcome = JsonParser.parse("[42]");
        assert_eq!(outcome.errors[0].row, 1);
        assert_eq!(outcome.errors[0].data, Some(Value::from(42)));
    }
}
