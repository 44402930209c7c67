//! Ticket record and its closed enumerations
//!
//! Every enumerated field is a Rust enum. Strings only become enum values through
//! `FromStr` (import parsers) or serde (HTTP bodies and queries); both reject unknown values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Unknown value for one of the closed enumerations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{field}\" must be one of [{}]", .expected.join(", "))]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

/// Generates `ALL`, `as_str`, `FromStr` and `Display` for a field enum whose serde
/// representation is snake_case.
macro_rules! field_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            const NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        field: $field,
                        value: other.to_string(),
                        expected: Self::NAMES,
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AccountAccess,
    TechnicalIssue,
    BillingQuestion,
    FeatureRequest,
    BugReport,
    #[default]
    Other,
}

field_enum!(Category, "category", {
    AccountAccess => "account_access",
    TechnicalIssue => "technical_issue",
    BillingQuestion => "billing_question",
    FeatureRequest => "feature_request",
    BugReport => "bug_report",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
}

field_enum!(Priority, "priority", {
    Urgent => "urgent",
    High => "high",
    Medium => "medium",
    Low => "low",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    New,
    InProgress,
    WaitingCustomer,
    Resolved,
    Closed,
}

field_enum!(Status, "status", {
    New => "new",
    InProgress => "in_progress",
    WaitingCustomer => "waiting_customer",
    Resolved => "resolved",
    Closed => "closed",
});

/// Channel the ticket was submitted through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    WebForm,
    Email,
    #[default]
    Api,
    Chat,
    Phone,
}

field_enum!(Source, "metadata.source", {
    WebForm => "web_form",
    Email => "email",
    Api => "api",
    Chat => "chat",
    Phone => "phone",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[default]
    Desktop,
    Mobile,
    Tablet,
}

field_enum!(DeviceType, "metadata.device_type", {
    Desktop => "desktop",
    Mobile => "mobile",
    Tablet => "tablet",
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketMetadata {
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    pub device_type: DeviceType,
}

/// Classification attached to a ticket, either by the classifier or by a manual override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub manually_classified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub customer_id: String,
    pub customer_email: String,
    pub customer_name: String,
    pub subject: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub metadata: TicketMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationData>,
}

/// Body of POST /tickets
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTicket {
    #[validate(length(min = 1, message = "\"customer_id\" is not allowed to be empty"))]
    pub customer_id: String,

    #[validate(email(message = "\"customer_email\" must be a valid email"))]
    pub customer_email: String,

    #[validate(length(min = 1, message = "\"customer_name\" is not allowed to be empty"))]
    pub customer_name: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "\"subject\" length must be between 1 and 200 characters"
    ))]
    pub subject: String,

    #[validate(length(
        min = 10,
        max = 2000,
        message = "\"description\" length must be between 10 and 2000 characters"
    ))]
    pub description: String,

    #[serde(default)]
    pub category: Option<Category>,

    #[serde(default)]
    pub priority: Option<Priority>,

    #[serde(default)]
    pub status: Option<Status>,

    #[serde(default)]
    pub assigned_to: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub metadata: TicketMetadata,

    /// Set by the server when auto-classification ran; never read from the body
    #[serde(skip)]
    pub classification: Option<ClassificationData>,
}

/// Body of PUT /tickets/:id. Unset fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TicketPatch {
    #[validate(email(message = "\"customer_email\" must be a valid email"))]
    pub customer_email: Option<String>,

    #[validate(length(min = 1, message = "\"customer_name\" is not allowed to be empty"))]
    pub customer_name: Option<String>,

    #[validate(length(
        min = 1,
        max = 200,
        message = "\"subject\" length must be between 1 and 200 characters"
    ))]
    pub subject: Option<String>,

    #[validate(length(
        min = 10,
        max = 2000,
        message = "\"description\" length must be between 10 and 2000 characters"
    ))]
    pub description: Option<String>,

    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub assigned_to: Option<String>,
    pub tags: Option<Vec<String>>,
    pub resolved_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub classification: Option<ClassificationData>,
}

impl TicketPatch {
    /// True when no client-settable field is present
    pub fn is_empty(&self) -> bool {
        self.customer_email.is_none()
            && self.customer_name.is_none()
            && self.subject.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.assigned_to.is_none()
            && self.tags.is_none()
            && self.resolved_at.is_none()
    }

    pub fn overrides_classification(&self) -> bool {
        self.category.is_some() || self.priority.is_some()
    }

    /// Patch that only changes category, priority and the classification block
    pub fn reclassify(
        category: Category,
        priority: Priority,
        classification: ClassificationData,
    ) -> Self {
        Self {
            category: Some(category),
            priority: Some(priority),
            classification: Some(classification),
            ..Default::default()
        }
    }

    /// Overwrite `ticket` with every field this patch sets
    pub(crate) fn apply_to(self, ticket: &mut Ticket) {
        if let Some(v) = self.customer_email {
            ticket.customer_email = v;
        }
        if let Some(v) = self.customer_name {
            ticket.customer_name = v;
        }
        if let Some(v) = self.subject {
            ticket.subject = v;
        }
        if let Some(v) = self.description {
            ticket.description = v;
        }
        if let Some(v) = self.category {
            ticket.category = v;
        }
        if let Some(v) = self.priority {
            ticket.priority = v;
        }
        if let Some(v) = self.status {
            ticket.status = v;
        }
        if let Some(v) = self.assigned_to {
            ticket.assigned_to = Some(v);
        }
        if let Some(v) = self.tags {
            ticket.tags = v;
        }
        if let Some(v) = self.resolved_at {
            ticket.resolved_at = Some(v);
        }
        if let Some(v) = self.classification {
            ticket.classification = Some(v);
        }
    }
}

/// Query of GET /tickets; an absent field places no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TicketFilters {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub customer_id: Option<String>,
    pub assigned_to: Option<String>,
}
