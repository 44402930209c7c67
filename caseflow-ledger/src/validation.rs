//! Validation of incoming transactions and list filters
//!
//! Request bodies are deserialized loosely (`serde_json::Value` per field) so that a wrong
//! JSON type is reported against its field instead of failing the whole body.

use std::str::FromStr;

use caseflow_common::api::FieldError;
use caseflow_common::time::{parse_date, parse_datetime};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::models::{Currency, NewTransaction, TransactionStatus, TransactionType};

static ACCOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ACC-[A-Za-z0-9]{5}$").expect("Invalid account regex"));

const MAX_DECIMAL_PLACES: u32 = 2;

/// POST /transactions body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(default)]
    pub from_account: Option<Value>,
    #[serde(default)]
    pub to_account: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default, rename = "type")]
    pub tx_type: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
}

/// Check every rule and collect all failures
pub fn validate_transaction(
    request: &TransactionRequest,
) -> Result<NewTransaction, Vec<FieldError>> {
    let mut errors = Vec::new();

    let amount = validate_amount(request.amount.as_ref(), &mut errors);
    let currency = validate_currency(request.currency.as_ref(), &mut errors);
    let tx_type = validate_type(request.tx_type.as_ref(), &mut errors);
    let from_account = validate_account("fromAccount", request.from_account.as_ref(), &mut errors);
    let to_account = validate_account("toAccount", request.to_account.as_ref(), &mut errors);
    let status = validate_status(request.status.as_ref(), &mut errors);

    if let Some(tx_type) = tx_type {
        check_legs(
            tx_type,
            present(request.from_account.as_ref()),
            present(request.to_account.as_ref()),
            &mut errors,
        );
    }

    match (amount, currency, tx_type, errors.is_empty()) {
        (Some(amount), Some(currency), Some(tx_type), true) => Ok(NewTransaction {
            from_account,
            to_account,
            amount,
            currency,
            tx_type,
            status,
        }),
        _ => Err(errors),
    }
}

/// `null` and absent are the same thing
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn validate_amount(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<Decimal> {
    let Some(value) = present(value) else {
        errors.push(FieldError::new("amount", "Amount is required"));
        return None;
    };
    let parsed = match value {
        Value::Number(number) => number_to_decimal(number),
        _ => None,
    };
    let Some(amount) = parsed else {
        errors.push(FieldError::new("amount", "Amount must be a number"));
        return None;
    };

    if amount <= Decimal::ZERO {
        errors.push(FieldError::new("amount", "Amount must be a positive number"));
        return None;
    }
    if amount.normalize().scale() > MAX_DECIMAL_PLACES {
        errors.push(FieldError::new(
            "amount",
            "Amount must have at most 2 decimal places",
        ));
        return None;
    }
    Some(amount.normalize())
}

/// Decimal from the number's shortest text form, so 0.1 stays 0.1
fn number_to_decimal(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(&text).ok()
    } else {
        Decimal::from_str(&text).ok()
    }
}

fn validate_currency(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<Currency> {
    let Some(value) = present(value) else {
        errors.push(FieldError::new("currency", "Currency is required"));
        return None;
    };
    let parsed = value.as_str().and_then(|code| code.parse::<Currency>().ok());
    if parsed.is_none() {
        let codes: Vec<&str> = Currency::ALL.iter().map(|c| c.code()).collect();
        errors.push(FieldError::new(
            "currency",
            format!("Invalid currency code. Must be one of: {}", codes.join(", ")),
        ));
    }
    parsed
}

fn validate_type(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<TransactionType> {
    let Some(value) = present(value) else {
        errors.push(FieldError::new("type", "Type is required"));
        return None;
    };
    let parsed = value.as_str().and_then(|t| t.parse::<TransactionType>().ok());
    if parsed.is_none() {
        errors.push(FieldError::new(
            "type",
            "Type must be one of: deposit, withdrawal, transfer",
        ));
    }
    parsed
}

fn validate_account(
    field: &str,
    value: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = present(value)?;
    match value.as_str() {
        Some(account) if ACCOUNT_PATTERN.is_match(account) => Some(account.to_string()),
        _ => {
            errors.push(FieldError::new(
                field,
                format!("{} must match format ACC-XXXXX (5 alphanumeric characters)", field),
            ));
            None
        }
    }
}

fn validate_status(value: Option<&Value>, errors: &mut Vec<FieldError>) -> TransactionStatus {
    let Some(value) = present(value) else {
        return TransactionStatus::default();
    };
    match value.as_str().and_then(|s| s.parse::<TransactionStatus>().ok()) {
        Some(status) => status,
        None => {
            errors.push(FieldError::new(
                "status",
                "Status must be one of: pending, completed, failed",
            ));
            TransactionStatus::default()
        }
    }
}

/// Which account legs each type needs
fn check_legs(
    tx_type: TransactionType,
    from: Option<&Value>,
    to: Option<&Value>,
    errors: &mut Vec<FieldError>,
) {
    match tx_type {
        TransactionType::Deposit => {
            if to.is_none() {
                errors.push(FieldError::new("toAccount", "toAccount is required for deposits"));
            }
        }
        TransactionType::Withdrawal => {
            if from.is_none() {
                errors.push(FieldError::new(
                    "fromAccount",
                    "fromAccount is required for withdrawals",
                ));
            }
        }
        TransactionType::Transfer => {
            if from.is_none() {
                errors.push(FieldError::new(
                    "fromAccount",
                    "fromAccount is required for transfers",
                ));
            }
            if to.is_none() {
                errors.push(FieldError::new("toAccount", "toAccount is required for transfers"));
            }
            if let (Some(from), Some(to)) = (from, to) {
                if from == to {
                    errors.push(FieldError::new(
                        "toAccount",
                        "fromAccount and toAccount must be different",
                    ));
                }
            }
        }
    }
}

/// GET /transactions and /transactions/export query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub account_id: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Parsed list filters; an absent field places no constraint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilters {
    pub account_id: Option<String>,
    pub tx_type: Option<TransactionType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TransactionQuery {
    /// Parse the query. A date-only `to` covers its whole day.
    pub fn into_filters(self) -> Result<TransactionFilters, Vec<FieldError>> {
        let mut errors = Vec::new();
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let tx_type = non_empty(self.tx_type).and_then(|t| match t.parse::<TransactionType>() {
            Ok(tx_type) => Some(tx_type),
            Err(()) => {
                errors.push(FieldError::new(
                    "type",
                    "Type must be one of: deposit, withdrawal, transfer",
                ));
                None
            }
        });

        let from = non_empty(self.from).and_then(|v| {
            let parsed = parse_datetime(&v);
            if parsed.is_none() {
                errors.push(FieldError::new("from", "from must be a valid date"));
            }
            parsed
        });

        let to = non_empty(self.to).and_then(|v| {
            let parsed = match parse_date(&v) {
                Some(day) => day
                    .and_hms_opt(0, 0, 0)
                    .map(|start| start.and_utc() + Duration::days(1) - Duration::milliseconds(1)),
                None => parse_datetime(&v),
            };
            if parsed.is_none() {
                errors.push(FieldError::new("to", "to must be a valid date"));
            }
            parsed
        });

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(TransactionFilters {
            account_id: non_empty(self.account_id),
            tx_type,
            from,
            to,
        })
    }
}
