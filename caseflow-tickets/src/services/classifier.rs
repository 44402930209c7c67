//! Keyword classifier for ticket category and priority
//!
//! Scores the lowercased `subject + " " + description` against fixed keyword tables.
//! Category: the best-scoring table wins (multi-word phrase 0.3, single word 0.15); below 0.3
//! falls back to `other`. Priority: urgent, high and low lists are checked and the most severe
//! tier with any match wins regardless of score; no match means `medium`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{Category, ClassificationData, Priority};

const PHRASE_WEIGHT: f64 = 0.3;
const WORD_WEIGHT: f64 = 0.15;
const MIN_CATEGORY_SCORE: f64 = 0.3;
const FALLBACK_CATEGORY_CONFIDENCE: f64 = 0.2;
const DEFAULT_PRIORITY_CONFIDENCE: f64 = 0.5;
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Declaration order doubles as the tie-break order
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::AccountAccess,
        &[
            "login",
            "password",
            "sign in",
            "authentication",
            "2fa",
            "two factor",
            "access denied",
            "locked out",
            "forgot password",
            "reset password",
            "cannot log in",
            "can't log in",
            "unable to login",
        ],
    ),
    (
        Category::TechnicalIssue,
        &[
            "error",
            "bug",
            "crash",
            "broken",
            "not working",
            "doesn't work",
            "fails",
            "failure",
            "issue",
            "problem",
            "500 error",
            "404",
            "exception",
            "stack trace",
        ],
    ),
    (
        Category::BillingQuestion,
        &[
            "payment",
            "invoice",
            "billing",
            "charge",
            "refund",
            "subscription",
            "price",
            "cost",
            "credit card",
            "receipt",
            "transaction",
            "overcharged",
            "cancel subscription",
        ],
    ),
    (
        Category::FeatureRequest,
        &[
            "feature",
            "enhancement",
            "suggestion",
            "would like",
            "could you add",
            "please add",
            "new feature",
            "improve",
            "improvement",
            "request",
            "wish",
            "want",
        ],
    ),
    (
        Category::BugReport,
        &[
            "bug",
            "defect",
            "incorrect",
            "wrong",
            "unexpected",
            "reproduce",
            "steps to reproduce",
            "regression",
            "should work",
            "expected",
            "actual",
        ],
    ),
];

/// Severity order; the first tier with a match wins
const PRIORITY_TIERS: &[(Priority, f64, &[&str])] = &[
    (
        Priority::Urgent,
        0.4,
        &[
            "can't access",
            "cannot access",
            "critical",
            "production down",
            "security",
            "urgent",
            "emergency",
            "immediately",
            "asap",
            "data loss",
            "outage",
            "down",
        ],
    ),
    (
        Priority::High,
        0.3,
        &[
            "important",
            "blocking",
            "high priority",
            "need soon",
            "customers affected",
            "revenue impact",
        ],
    ),
    (
        Priority::Low,
        0.2,
        &[
            "minor",
            "cosmetic",
            "suggestion",
            "nice to have",
            "low priority",
            "when you have time",
        ],
    ),
];

/// Classifier output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub priority: Priority,
    /// Mean of category and priority confidence, capped at 1.0, two decimals
    pub confidence: f64,
    pub reasoning: String,
    /// Category keywords followed by priority keywords
    pub keywords: Vec<String>,
}

impl Classification {
    /// Block stored on a ticket after automatic classification
    pub fn to_ticket_data(&self) -> ClassificationData {
        ClassificationData {
            confidence: Some(self.confidence),
            keywords: self.keywords.clone(),
            reasoning: Some(self.reasoning.clone()),
            manually_classified: false,
        }
    }
}

struct Decision<T> {
    value: T,
    confidence: f64,
    keywords: Vec<&'static str>,
}

/// Classify a ticket from its subject and description
pub fn classify(subject: &str, description: &str) -> Classification {
    let text = format!("{} {}", subject, description).to_lowercase();

    let category = classify_category(&text);
    let priority = classify_priority(&text);

    let average = (category.confidence + priority.confidence) / 2.0;
    let confidence = round2(average.min(1.0));
    let reasoning = reasoning(&category, &priority, average);

    let keywords: Vec<String> = category
        .keywords
        .iter()
        .chain(priority.keywords.iter())
        .map(|k| k.to_string())
        .collect();

    info!(
        event = "ticket_classification",
        subject = %subject,
        category = %category.value,
        priority = %priority.value,
        confidence,
        keywords = ?keywords,
        "Ticket classified"
    );

    Classification {
        category: category.value,
        priority: priority.value,
        confidence,
        reasoning,
        keywords,
    }
}

fn classify_category(text: &str) -> Decision<Category> {
    let mut best: Option<(Category, f64, Vec<&'static str>)> = None;

    for (category, keywords) in CATEGORY_KEYWORDS {
        let matched: Vec<&'static str> = keywords
            .iter()
            .copied()
            .filter(|k| text.contains(k))
            .collect();
        if matched.is_empty() {
            continue;
        }

        let score: f64 = matched
            .iter()
            .map(|k| if k.contains(' ') { PHRASE_WEIGHT } else { WORD_WEIGHT })
            .sum();

        if best.as_ref().map_or(true, |(_, best_score, _)| score > *best_score) {
            best = Some((*category, score, matched));
        }
    }

    match best {
        Some((category, score, keywords)) if score >= MIN_CATEGORY_SCORE => Decision {
            value: category,
            confidence: score.min(1.0),
            keywords,
        },
        _ => Decision {
            value: Category::Other,
            confidence: FALLBACK_CATEGORY_CONFIDENCE,
            keywords: Vec::new(),
        },
    }
}

fn classify_priority(text: &str) -> Decision<Priority> {
    PRIORITY_TIERS
        .iter()
        .find_map(|(priority, weight, keywords)| {
            let matched: Vec<&'static str> = keywords
                .iter()
                .copied()
                .filter(|k| text.contains(k))
                .collect();
            (!matched.is_empty()).then(|| Decision {
                value: *priority,
                confidence: (matched.len() as f64 * weight).min(1.0),
                keywords: matched,
            })
        })
        .unwrap_or(Decision {
            value: Priority::Medium,
            confidence: DEFAULT_PRIORITY_CONFIDENCE,
            keywords: Vec::new(),
        })
}

fn reasoning(category: &Decision<Category>, priority: &Decision<Priority>, average: f64) -> String {
    let mut parts = Vec::with_capacity(3);

    if category.value == Category::Other {
        parts.push("Categorized as \"other\" due to insufficient matching keywords.".to_string());
    } else {
        parts.push(format!(
            "Categorized as \"{}\" based on keywords: {}.",
            category.value,
            category.keywords.join(", ")
        ));
    }

    if priority.keywords.is_empty() {
        parts.push(format!(
            "Priority defaulted to \"{}\" (no specific priority indicators found).",
            priority.value
        ));
    } else {
        parts.push(format!(
            "Priority set to \"{}\" based on keywords: {}.",
            priority.value,
            priority.keywords.join(", ")
        ));
    }

    if average < LOW_CONFIDENCE_THRESHOLD {
        parts.push("Confidence is low; manual review recommended.".to_string());
    }

    parts.join(" ")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
