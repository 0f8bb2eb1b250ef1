//! Shared data models for YTA operations
//!
//! This module provides the records exchanged with the YouTube Assistant API
//! (templates and projects) and the local draft types used by the create and
//! update forms, so every command and the selector agree on one shape.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::YtaError;
use crate::placeholder::{
    ValidationReport, validate_template_content, validate_template_name, validate_template_type,
};

/// Partition key scoping which templates are offered for a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    /// Templates for a project's video title
    Title,
    /// Templates for a project's video description
    Description,
}

impl TemplateType {
    /// All known template types, in display order.
    pub const ALL: [TemplateType; 2] = [TemplateType::Title, TemplateType::Description];

    /// Wire name of the type, as used in `?type=` filters and JSON bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TemplateType::Title => "title",
            TemplateType::Description => "description",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = YtaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(TemplateType::Title),
            "description" => Ok(TemplateType::Description),
            _ => Err(YtaError::InvalidTemplateType {
                value: s.to_string(),
            }),
        }
    }
}

/// A user-authored text template as returned by the API.
///
/// The content invariants (length, at least one placeholder, no empty
/// placeholders) are enforced when a template is created or edited, not when
/// it is read back, so a `Template` is never re-validated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    pub name: String,
    pub content: String,
    #[serde(default = "default_workspace_id")]
    pub workspace_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

const fn default_workspace_id() -> i64 {
    crate::constants::DEFAULT_WORKSPACE_ID
}

/// A video project; only the fields the apply workflow reads are modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDraft {
    #[serde(rename = "type")]
    pub template_type: String,
    pub name: String,
    pub content: String,
}

impl TemplateDraft {
    pub fn new(
        template_type: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            template_type: template_type.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// Trim surrounding whitespace from every field, as the server does
    /// before storing a template.
    #[must_use]
    pub fn normalize(self) -> Self {
        Self {
            template_type: self.template_type.trim().to_string(),
            name: self.name.trim().to_string(),
            content: self.content.trim().to_string(),
        }
    }

    /// Validate every field, collecting all failed rules.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        validate_template_type(&self.template_type)
            .merge(validate_template_name(&self.name))
            .merge(validate_template_content(&self.content))
    }

    /// Parsed template type; only meaningful once [`validate`](Self::validate) passed.
    pub fn parsed_type(&self) -> Result<TemplateType, YtaError> {
        self.template_type.parse()
    }
}

/// Body of a partial update request. Unset fields are left untouched by the
/// server and are not validated locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl TemplatePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.template_type.is_none() && self.name.is_none() && self.content.is_none()
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        Self {
            template_type: self.template_type.map(|t| t.trim().to_string()),
            name: self.name.map(|n| n.trim().to_string()),
            content: self.content.map(|c| c.trim().to_string()),
        }
    }

    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::ok();
        if let Some(template_type) = &self.template_type {
            report = report.merge(validate_template_type(template_type));
        }
        if let Some(name) = &self.name {
            report = report.merge(validate_template_name(name));
        }
        if let Some(content) = &self.content {
            report = report.merge(validate_template_content(content));
        }
        report
    }
}

/// Find a template of the same type whose content matches `content`
/// case-insensitively, ignoring `exclude_id` (the template being edited).
///
/// Mirrors the server's duplicate rule so a form can warn before submitting.
#[must_use]
pub fn find_duplicate_content<'a>(
    templates: &'a [Template],
    template_type: TemplateType,
    content: &str,
    exclude_id: Option<i64>,
) -> Option<&'a Template> {
    let needle = content.trim().to_lowercase();
    templates.iter().find(|t| {
        t.template_type == template_type
            && Some(t.id) != exclude_id
            && t.content.trim().to_lowercase() == needle
    })
}
