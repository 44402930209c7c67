//! CSV import: one ticket per row, header row names the fields

use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::{Map, Value};
use tracing::debug;

use super::{validate_record, ParseOutcome, TicketParser};
use crate::models::RowError;

/// Row number of the first data row; the header is row 1
const FIRST_DATA_ROW: usize = 2;

pub struct CsvParser;

impl TicketParser for CsvParser {
    fn parse(&self, content: &str) -> ParseOutcome {
        let content = content.trim_start_matches('\u{feff}');
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(e) => return ParseOutcome::document_error(format!("CSV parsing failed: {}", e)),
        };

        let mut outcome = ParseOutcome::default();
        for (index, result) in reader.records().enumerate() {
            let row = index + FIRST_DATA_ROW;
            match result {
                Ok(record) => validate_record(row, to_object(&headers, &record), &mut outcome),
                Err(e) => outcome
                    .errors
                    .push(RowError::new(row, format!("CSV parsing failed: {}", e))),
            }
        }

        debug!(
            records = outcome.records.len(),
            errors = outcome.errors.len(),
            "Parsed CSV"
        );
        outcome
    }
}

/// Pair cells with headers; empty cells and cells beyond the header are dropped
fn to_object(headers: &StringRecord, record: &StringRecord) -> Map<String, Value> {
    headers
        .iter()
        .zip(record.iter())
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority};

    const HEADER: &str =
        "customer_id,customer_email,customer_name,subject,description,category,priority,tags";

    #[test]
    fn header_only_is_empty() {
        let outcome = CsvParser.parse(HEADER);
        assert!(outcome.records.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn empty_document_is_empty() {
        let outcome = CsvParser.parse("");
        assert!(outcome.records.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn rows_are_parsed_and_trimmed() {
        let content = format!(
            "{}\n{}\n",
            HEADER,
            " CUST-1 , a@example.com, Ann ,Login broken,I cannot log in since Monday,\
             account_access,high,\"vip, eu\""
        );
        let outcome = CsvParser.parse(&content);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let ticket = &outcome.records[0];
        assert_eq!(ticket.customer_id, "CUST-1");
        assert_eq!(ticket.customer_name, "Ann");
        assert_eq!(ticket.category, Some(Category::AccountAccess));
        assert_eq!(ticket.priority, Some(Priority::High));
        assert_eq!(ticket.tags, vec!["vip", "eu"]);
    }

    #[test]
    fn invalid_row_reports_its_line_number() {
        let content = format!(
            "{h}\n{ok}\n{bad}\n",
            h = HEADER,
            ok = "C1,a@example.com,Ann,Subject,Long enough description,,,",
            bad = "C2,,Bob,Subject,Long enough description,,,"
        );
        let outcome = CsvParser.parse(&content);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 3);
        assert!(outcome.errors[0].error.contains("customer_email"));
        let data = outcome.errors[0].data.as_ref().unwrap();
        assert_eq!(data["customer_id"], "C2");
    }

    #[test]
    fn ragged_rows_and_bom_are_tolerated() {
        let content = "\u{feff}customer_id,customer_email,customer_name,subject,description\n\
                       C1,a@example.com,Ann,Subject,Long enough description\n\
                       C2,b@example.com,Bob,Subject,Long enough description,extra,cells\n";
        let outcome = CsvParser.parse(content);
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.records[0].customer_id, "C1");
    }

    #[test]
    fn camel_case_headers_are_accepted() {
        let content = "customerId,customerEmail,customerName,subject,description,assignedTo\n\
                       C1,a@example.com,Ann,Subject,Long enough description,agent-7\n";
        let outcome = CsvParser.parse(content);
        assert_eq!(outcome.records[0].customer_id, "C1");
        assert_eq!(outcome.records[0].assigned_to.as_deref(), Some("agent-7"));
    }
}
