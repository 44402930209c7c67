//! Import parsers for CSV, JSON and XML ticket documents
//!
//! Each parser turns its document into one JSON object per record, then hands every object
//! to [`validate_record`]. Field-name normalization, defaults and validation therefore live in
//! one place and behave identically for all three formats.
//!
//! A record that fails validation becomes a [`RowError`] and parsing continues. Only a
//! document that cannot be read at all produces a row-0 error.

pub mod csv;
pub mod json;
pub mod xml;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use validator::Validate;

use caseflow_common::time::parse_datetime;

use crate::models::{
    Category, DeviceType, FileType, Priority, RowError, Source, Status, TicketMetadata,
};
use crate::validation::field_errors;

pub use self::csv::CsvParser;
pub use self::json::JsonParser;
pub use self::xml::XmlParser;

/// A record from an import document that passed validation
///
/// `category` and `priority` stay `None` when the record did not set them, so the importer can
/// tell "missing" from "explicitly other/medium".
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTicket {
    pub customer_id: String,
    pub customer_email: String,
    pub customer_name: String,
    pub subject: String,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Status,
    pub assigned_to: Option<String>,
    pub tags: Vec<String>,
    pub metadata: TicketMetadata,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parser output: valid records plus one error per rejected record
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub records: Vec<ParsedTicket>,
    pub errors: Vec<RowError>,
}

impl ParseOutcome {
    /// Outcome for a document that could not be read at all
    pub fn document_error(message: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            errors: vec![RowError::new(0, message)],
        }
    }
}

/// One import format
pub trait TicketParser: Send + Sync {
    fn parse(&self, content: &str) -> ParseOutcome;
}

/// Parser for `file_type`
pub fn parser_for(file_type: FileType) -> &'static dyn TicketParser {
    match file_type {
        FileType::Csv => &CsvParser,
        FileType::Json => &JsonParser,
        FileType::Xml => &XmlParser,
    }
}

/// Normalize, validate and file one raw record under `row`
pub(crate) fn validate_record(row: usize, raw: Map<String, Value>, outcome: &mut ParseOutcome) {
    match TicketDraft::from_record(&raw).into_parsed() {
        Ok(parsed) => outcome.records.push(parsed),
        Err(messages) => outcome
            .errors
            .push(RowError::new(row, messages.join("; ")).with_data(Value::Object(raw))),
    }
}

/// Record after field-name normalization, before type checks
#[derive(Debug, Default, Validate)]
struct TicketDraft {
    #[validate(length(min = 1, message = "\"customer_id\" is required"))]
    customer_id: String,

    #[validate(email(message = "\"customer_email\" must be a valid email"))]
    customer_email: String,

    #[validate(length(min = 1, message = "\"customer_name\" is required"))]
    customer_name: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "\"subject\" length must be between 1 and 200 characters"
    ))]
    subject: String,

    #[validate(length(
        min = 10,
        max = 2000,
        message = "\"description\" length must be between 10 and 2000 characters"
    ))]
    description: String,

    category: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    assigned_to: Option<String>,
    tags: Vec<String>,
    source: Option<String>,
    device_type: Option<String>,
    browser: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TicketDraft {
    fn from_record(raw: &Map<String, Value>) -> Self {
        let metadata = raw.get("metadata").and_then(Value::as_object);
        let meta_field = |snake: &str, camel: &str| {
            metadata
                .and_then(|m| field(m, snake, camel))
                .or_else(|| field(raw, snake, camel))
        };

        Self {
            customer_id: field(raw, "customer_id", "customerId").unwrap_or_default(),
            customer_email: field(raw, "customer_email", "customerEmail").unwrap_or_default(),
            customer_name: field(raw, "customer_name", "customerName").unwrap_or_default(),
            subject: field(raw, "subject", "subject").unwrap_or_default(),
            description: field(raw, "description", "description").unwrap_or_default(),
            category: field(raw, "category", "category"),
            priority: field(raw, "priority", "priority"),
            status: field(raw, "status", "status"),
            assigned_to: field(raw, "assigned_to", "assignedTo"),
            tags: raw.get("tags").map(tag_list).unwrap_or_default(),
            source: meta_field("source", "source"),
            device_type: meta_field("device_type", "deviceType"),
            browser: meta_field("browser", "browser"),
            created_at: field(raw, "created_at", "createdAt").and_then(|s| parse_datetime(&s)),
            updated_at: field(raw, "updated_at", "updatedAt").and_then(|s| parse_datetime(&s)),
        }
    }

    /// Run field rules, then parse enumerated values. Collects every failure.
    fn into_parsed(self) -> Result<ParsedTicket, Vec<String>> {
        let mut messages: Vec<String> = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => field_errors(&errors).into_iter().map(|e| e.message).collect(),
        };

        let category = parse_optional::<Category>(self.category.as_deref(), &mut messages);
        let priority = parse_optional::<Priority>(self.priority.as_deref(), &mut messages);
        let status = parse_optional::<Status>(self.status.as_deref(), &mut messages);
        let source = parse_optional::<Source>(self.source.as_deref(), &mut messages);
        let device_type = parse_optional::<DeviceType>(self.device_type.as_deref(), &mut messages);

        if !messages.is_empty() {
            return Err(messages);
        }

        Ok(ParsedTicket {
            customer_id: self.customer_id,
            customer_email: self.customer_email,
            customer_name: self.customer_name,
            subject: self.subject,
            description: self.description,
            category,
            priority,
            status: status.unwrap_or_default(),
            assigned_to: self.assigned_to,
            tags: self.tags,
            metadata: TicketMetadata {
                source: source.unwrap_or_default(),
                browser: self.browser,
                device_type: device_type.unwrap_or_default(),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_optional<T>(value: Option<&str>, messages: &mut Vec<String>) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value?.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            messages.push(e.to_string());
            None
        }
    }
}

/// First non-empty value of `snake` then `camel`
fn field(record: &Map<String, Value>, snake: &str, camel: &str) -> Option<String> {
    record
        .get(snake)
        .and_then(scalar_text)
        .or_else(|| record.get(camel).and_then(scalar_text))
}

/// Text of a scalar value; XML elements that carry attributes keep their text under `_text`
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => return map.get(xml::TEXT_KEY).and_then(scalar_text),
        Value::Null | Value::Array(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Tags from a JSON array, a comma-separated string or an XML `<tags><tag/>..</tags>` element
fn tag_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items.iter().flat_map(tag_list).collect(),
        Value::Object(map) => map.get("tag").map(tag_list).unwrap_or_default(),
        Value::Number(_) | Value::Bool(_) => scalar_text(value).into_iter().collect(),
        Value::Null => Vec::new(),
    }
}
