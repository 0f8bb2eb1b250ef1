//! Creation/edit rules for template fields.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::scan::extract_placeholders;
use crate::constants::{MAX_CONTENT_LENGTH, MAX_NAME_LENGTH, MAX_TYPE_LENGTH};
use crate::models::TemplateType;

/// A single violated rule.
///
/// Each variant renders as one user-facing message, so a form can list the
/// reasons directly under the offending field (see [`ValidationIssue::field`]).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("Content must not be empty or whitespace")]
    ContentEmpty,

    #[error("Content must be at most {max} characters (got {length})")]
    ContentTooLong {
        length: usize,
        max: usize,
    },

    #[error("Content must contain at least one placeholder such as {{{{topic}}}}")]
    MissingPlaceholder,

    #[error("Content contains {count} empty placeholder(s); every placeholder needs a name")]
    EmptyPlaceholder {
        count: usize,
    },

    #[error("Name must not be empty or whitespace")]
    NameEmpty,

    #[error("Name must be at most {max} characters (got {length})")]
    NameTooLong {
        length: usize,
        max: usize,
    },

    #[error("Type must not be empty")]
    TypeEmpty,

    #[error("Type must be at most {max} characters (got {length})")]
    TypeTooLong {
        length: usize,
        max: usize,
    },

    #[error("Unknown template type '{value}' (expected 'title' or 'description')")]
    UnknownType {
        value: String,
    },
}

impl ValidationIssue {
    /// Name of the form field the rule applies to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            ValidationIssue::ContentEmpty
            | ValidationIssue::ContentTooLong {
                ..
            }
            | ValidationIssue::MissingPlaceholder
            | ValidationIssue::EmptyPlaceholder {
                ..
            } => "content",
            ValidationIssue::NameEmpty
            | ValidationIssue::NameTooLong {
                ..
            } => "name",
            ValidationIssue::TypeEmpty
            | ValidationIssue::TypeTooLong {
                ..
            }
            | ValidationIssue::UnknownType {
                ..
            } => "type",
        }
    }
}

/// Outcome of a validation: `valid` is true exactly when `reasons` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub reasons: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn ok() -> Self {
        Self::from_reasons(Vec::new())
    }

    #[must_use]
    pub fn from_reasons(reasons: Vec<ValidationIssue>) -> Self {
        Self {
            valid: reasons.is_empty(),
            reasons,
        }
    }

    /// Combine two reports, keeping the reasons of both in order.
    #[must_use]
    pub fn merge(mut self, other: ValidationReport) -> Self {
        self.reasons.extend(other.reasons);
        Self::from_reasons(self.reasons)
    }

    /// Whether any reason is about `field` ("content", "name" or "type").
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.reasons.iter().any(|r| r.field() == field)
    }

    /// One message per failed rule.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        let messages = self
            .reasons
            .iter()
            .map(|r| format!("{}: {r}", r.field()))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&messages)
    }
}

/// Validate template content.
///
/// Surrounding whitespace is ignored. Valid only if the trimmed length is in
/// `1..=256` characters, at least one non-empty placeholder exists, and no
/// empty placeholder is present. All failed rules are reported.
#[must_use]
pub fn validate_template_content(content: &str) -> ValidationReport {
    let trimmed = content.trim();
    let length = trimmed.chars().count();
    let mut reasons = Vec::new();

    if length == 0 {
        reasons.push(ValidationIssue::ContentEmpty);
    } else if length > MAX_CONTENT_LENGTH {
        reasons.push(ValidationIssue::ContentTooLong {
            length,
            max: MAX_CONTENT_LENGTH,
        });
    }

    let placeholders = extract_placeholders(trimmed);
    if placeholders.is_empty() {
        reasons.push(ValidationIssue::MissingPlaceholder);
    }
    if placeholders.has_empty() {
        reasons.push(ValidationIssue::EmptyPlaceholder {
            count: placeholders.empty_count(),
        });
    }

    ValidationReport::from_reasons(reasons)
}

/// Validate a template name: 1 to 100 characters after trimming.
#[must_use]
pub fn validate_template_name(name: &str) -> ValidationReport {
    let length = name.trim().chars().count();

    let reasons = if length == 0 {
        vec![ValidationIssue::NameEmpty]
    } else if length > MAX_NAME_LENGTH {
        vec![ValidationIssue::NameTooLong {
            length,
            max: MAX_NAME_LENGTH,
        }]
    } else {
        Vec::new()
    };

    ValidationReport::from_reasons(reasons)
}

/// Validate a template type value: non-empty, at most 50 characters, and one
/// of the known [`TemplateType`]s.
#[must_use]
pub fn validate_template_type(value: &str) -> ValidationReport {
    let trimmed = value.trim();
    let length = trimmed.chars().count();

    let reasons = if length == 0 {
        vec![ValidationIssue::TypeEmpty]
    } else if length > MAX_TYPE_LENGTH {
        vec![ValidationIssue::TypeTooLong {
            length,
            max: MAX_TYPE_LENGTH,
        }]
    } else if trimmed.parse::<TemplateType>().is_err() {
        vec![ValidationIssue::UnknownType {
            value: trimmed.to_string(),
        }]
    } else {
        Vec::new()
    };

    ValidationReport::from_reasons(reasons)
}
