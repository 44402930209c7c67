//! Conversion of `validator` results into API field errors

use caseflow_common::api::FieldError;
use validator::ValidationErrors;

/// Flatten `errors` into one entry per failed rule, ordered by field name
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            let field = field.to_string();
            failures.iter().map(move |failure| {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("\"{}\" is invalid ({})", field, failure.code));
                FieldError::new(field.clone(), message)
            })
        })
        .collect();

    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}
