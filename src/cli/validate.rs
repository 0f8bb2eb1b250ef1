//! Offline template checks: `validate` and `placeholders`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::OutputFormat;
use crate::core::YtaError;
use crate::placeholder::{
    ValidationReport, extract_placeholders, validate_template_content, validate_template_name,
    validate_template_type,
};

/// Check a template against the same rules the API enforces.
///
/// Exits non-zero with one line per failed rule when invalid.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Template name (checked when given)
    #[arg(long)]
    pub name: Option<String>,

    /// Template content
    #[arg(long)]
    pub content: String,

    /// Template type (checked when given)
    #[arg(long = "type", value_name = "TYPE")]
    pub template_type: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ValidateOutput {
    valid: bool,
    reasons: Vec<String>,
    placeholders: Vec<String>,
}

impl ValidateCommand {
    pub fn execute(self) -> Result<()> {
        let report = self.report();
        let placeholders = extract_placeholders(self.content.trim());

        match self.format {
            OutputFormat::Json => {
                let output = ValidateOutput {
                    valid: report.valid,
                    reasons: report.messages(),
                    placeholders: placeholders.tokens().to_vec(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if report.valid {
                    println!("{} Template is valid", "✓".green());
                    let tokens: Vec<String> = placeholders.display_tokens().collect();
                    println!("  Placeholders: {}", tokens.join(", "));
                } else {
                    for reason in &report.reasons {
                        println!("{} {}: {reason}", "✗".red(), reason.field());
                    }
                }
            }
        }

        if report.valid {
            Ok(())
        } else {
            Err(YtaError::InvalidTemplate {
                report,
            }
            .into())
        }
    }

    fn report(&self) -> ValidationReport {
        let mut report = ValidationReport::ok();
        if let Some(template_type) = &self.template_type {
            report = report.merge(validate_template_type(template_type));
        }
        if let Some(name) = &self.name {
            report = report.merge(validate_template_name(name));
        }
        report.merge(validate_template_content(&self.content))
    }
}

/// Print the distinct placeholder tokens in first-appearance order.
#[derive(Args, Debug)]
pub struct PlaceholdersCommand {
    /// Content to scan
    pub content: String,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct PlaceholdersOutput<'a> {
    tokens: &'a [String],
    empty: usize,
}

impl PlaceholdersCommand {
    pub fn execute(self) -> Result<()> {
        let found = extract_placeholders(&self.content);

        match self.format {
            OutputFormat::Json => {
                let output = PlaceholdersOutput {
                    tokens: found.tokens(),
                    empty: found.empty_count(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if found.is_empty() {
                    println!("No placeholders found");
                }
                for token in found.tokens() {
                    println!("{token}");
                }
                if found.has_empty() {
                    println!(
                        "{} {} empty placeholder(s)",
                        "⚠".yellow(),
                        found.empty_count()
                    );
                }
            }
        }
        Ok(())
    }
}
