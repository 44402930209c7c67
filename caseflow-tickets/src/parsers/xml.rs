//! XML import: `<tickets>` root with one `<ticket>` element per record
//!
//! The document is folded into a `serde_json::Value` tree first. Attributes become fields,
//! repeated child elements become arrays, and an element with both attributes and text keeps
//! the text under [`TEXT_KEY`]. Records then go through the same validation as JSON.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};
use tracing::debug;

use super::{validate_record, ParseOutcome, TicketParser};
use crate::models::RowError;

/// Key holding element text when the element also has attributes or children
pub(crate) const TEXT_KEY: &str = "_text";

const ROOT: &str = "tickets";
const RECORD: &str = "ticket";

#[derive(Debug, thiserror::Error)]
enum TreeError {
    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),
    #[error(transparent)]
    Attribute(#[from] AttrError),
    #[error("unexpected end of document inside <{0}>")]
    Unclosed(String),
}

pub struct XmlParser;

impl TicketParser for XmlParser {
    fn parse(&self, content: &str) -> ParseOutcome {
        let (root, tree) = match build_tree(content) {
            Ok(Some(root)) => root,
            Ok(None) => {
                return ParseOutcome::document_error("XML must have a root <tickets> element")
            }
            Err(e) => return ParseOutcome::document_error(format!("XML parsing failed: {}", e)),
        };
        if root != ROOT {
            return ParseOutcome::document_error("XML must have a root <tickets> element");
        }

        let entries = match tree {
            Value::Object(mut children) => match children.remove(RECORD) {
                Some(Value::Array(items)) => items,
                Some(single) => vec![single],
                None => Vec::new(),
            },
            _ => Vec::new(),
        };

        let mut outcome = ParseOutcome::default();
        for (index, entry) in entries.into_iter().enumerate() {
            let row = index + 1;
            match entry {
                Value::Object(map) => validate_record(row, map, &mut outcome),
                other => outcome.errors.push(
                    RowError::new(row, "Ticket entry must be an object").with_data(other),
                ),
            }
        }

        debug!(
            records = outcome.records.len(),
            errors = outcome.errors.len(),
            "Parsed XML"
        );
        outcome
    }
}

/// Element under construction
struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, TreeError> {
        let mut children = Map::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            insert_child(&mut children, key, Value::String(value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim().to_string();
        let value = if self.children.is_empty() {
            Value::String(text)
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                children.insert(TEXT_KEY.to_string(), Value::String(text));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

/// A repeated key turns into an array in document order
fn insert_child(children: &mut Map<String, Value>, key: String, value: Value) {
    match children.get_mut(&key) {
        None => {
            children.insert(key, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

/// Fold the document into `(root name, root value)`; `None` when there is no root element
fn build_tree(content: &str) -> Result<Option<(String, Value)>, TreeError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    let mut finish = |frame: Frame, stack: &mut Vec<Frame>| {
        let (name, value) = frame.close();
        match stack.last_mut() {
            Some(parent) => insert_child(&mut parent.children, name, value),
            None => {
                if root.is_none() {
                    root = Some((name, value));
                }
            }
        }
    };

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let frame = Frame::open(&start)?;
                stack.push(frame);
            }
            Event::Empty(start) => {
                let frame = Frame::open(&start)?;
                finish(frame, &mut stack);
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    finish(frame, &mut stack);
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(TreeError::Unclosed(open.name.clone()));
    }
    Ok(root)
}
