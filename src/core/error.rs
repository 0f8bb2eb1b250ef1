//! Error handling for YTA
//!
//! This module provides the error types and user-facing error reporting for the
//! YTA command-line tool. It follows two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`YtaError`] - Enumerated error types for every failure case in YTA
//! - [`ErrorContext`] - Wrapper that adds suggestions and details for display
//!
//! Use [`user_friendly_error`] to convert any [`anyhow::Error`] into an
//! [`ErrorContext`] that the binary prints before exiting.
//!
//! Note that the placeholder engine and the selector state machine never
//! produce these errors: validation failures are reported as
//! [`ValidationReport`]s and collaborator failures become selector state. The
//! types here cover the outer surfaces (configuration, HTTP, CLI).
//!
//! # Examples
//!
//! ```rust,no_run
//! use yta_cli::core::{ErrorContext, YtaError};
//!
//! let context = ErrorContext::new(YtaError::TemplateNotFound { id: 42 })
//!     .with_suggestion("Run 'yta list' to see the available templates");
//! context.display();
//! ```
//!
//! [`ValidationReport`]: crate::placeholder::ValidationReport

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::placeholder::ValidationReport;

/// The main error type for YTA operations
#[derive(Error, Debug, Clone)]
pub enum YtaError {
    /// Configuration file could not be used
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The API server could not be reached at all
    ///
    /// Raised for connection refusals, DNS failures, and timeouts enforced by
    /// the HTTP client.
    #[error("Cannot reach the YTA API at {url}")]
    ApiUnreachable {
        /// Base URL that was contacted
        url: String,
        /// Transport-level reason
        reason: String,
    },

    /// The API answered with a non-success status
    #[error("API request '{operation}' failed with HTTP {status}: {message}")]
    ApiRequestFailed {
        /// Short name of the request (e.g. "list templates")
        operation: String,
        /// HTTP status code
        status: u16,
        /// The server's `detail` message, or the raw body
        message: String,
    },

    #[error("Template {id} not found")]
    TemplateNotFound {
        id: i64,
    },

    /// No template of the requested type carries the given name
    #[error("No template named '{name}'")]
    TemplateNameNotFound {
        name: String,
        /// Closest names by edit distance
        suggestions: Vec<String>,
    },

    #[error("Project {id} not found")]
    ProjectNotFound {
        id: i64,
    },

    /// Local validation rejected a template before it reached the server
    #[error("Invalid template: {report}")]
    InvalidTemplate {
        report: ValidationReport,
    },

    #[error("Invalid template type: {value}")]
    InvalidTemplateType {
        value: String,
    },

    /// The server rejected a template whose content already exists (HTTP 409)
    #[error("Template with this content already exists: {message}")]
    DuplicateTemplate {
        message: String,
    },

    /// Applying would overwrite a non-empty value and no confirmation was given
    #[error("Target already has a value: '{current}'")]
    ConfirmationRequired {
        /// The value that would be replaced
        current: String,
    },

    #[error("Failed to load templates: {message}")]
    FetchFailed {
        message: String,
    },

    #[error("Failed to apply template: {message}")]
    ApplyFailed {
        message: String,
    },

    /// The selector session ended before producing a result
    #[error("Template selector closed unexpectedly")]
    SelectorClosed,

    #[error("{message}")]
    Other {
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying YTA error
    pub error: YtaError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: YtaError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`] with suggestions.
///
/// [`YtaError`]s get tailored suggestions; I/O, TOML, and HTTP errors are
/// recognised by downcasting; anything else is reported with its full cause
/// chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(yta_error) = error.downcast_ref::<YtaError>() {
        return create_error_context(yta_error.clone());
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(YtaError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your config file. Verify quotes and key names")
        .with_details("The config file is read from ~/.yta/config.toml unless YTA_CONFIG or --config points elsewhere");
    }

    if let Some(http_error) = error.downcast_ref::<reqwest::Error>() {
        let url = http_error.url().map_or_else(|| "unknown".to_string(), ToString::to_string);
        return ErrorContext::new(YtaError::ApiUnreachable {
            url,
            reason: http_error.to_string(),
        })
        .with_suggestion("Check that the YTA backend is running and that 'api_url' in your config is correct")
        .with_details(if http_error.is_timeout() {
            "The request timed out. Increase 'request_timeout_secs' if the server is slow"
        } else {
            "The HTTP request could not be completed"
        });
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(YtaError::ConfigError {
                message: io_error.to_string(),
            })
            .with_suggestion("Check the permissions of your config file and its directory");
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(YtaError::Other {
        message,
    })
}

fn create_error_context(error: YtaError) -> ErrorContext {
    let (suggestion, details): (Option<String>, Option<String>) = match &error {
        YtaError::ApiUnreachable {
            reason,
            ..
        } => (
            Some("Check that the YTA backend is running and that 'api_url' in your config is correct".into()),
            Some(reason.clone()),
        ),

        YtaError::TemplateNotFound {
            ..
        } => (
            Some("Run 'yta list' to see the templates in your workspace".into()),
            Some("Templates are scoped to a workspace; check 'workspace_id' in your config".into()),
        ),

        YtaError::TemplateNameNotFound {
            suggestions,
            ..
        } => {
            let suggestion = if suggestions.is_empty() {
                "Run 'yta list' to see the available template names".to_string()
            } else {
                format!("Did you mean: {}?", suggestions.join(", "))
            };
            (Some(suggestion), None)
        }

        YtaError::ProjectNotFound {
            ..
        } => (Some("Check the project id; projects are listed in the web app".into()), None),

        YtaError::InvalidTemplate {
            report,
        } => (
            Some("Fix the listed fields and try again; use 'yta validate' to check without saving".into()),
            Some(report.messages().join("\n")),
        ),

        YtaError::InvalidTemplateType {
            ..
        } => (Some("Use 'title' or 'description'".into()), None),

        YtaError::DuplicateTemplate {
            ..
        } => (
            Some("Edit the existing template instead, or change the content".into()),
            Some("Template content must be unique per type within a workspace (case-insensitive)".into()),
        ),

        YtaError::ConfirmationRequired {
            ..
        } => (
            Some("Re-run with --force to replace the existing value".into()),
            Some("Applying a template overwrites the current value of the target field".into()),
        ),

        YtaError::ConfigError {
            ..
        } => (Some("Check your config file, or remove it to fall back to the defaults".into()), None),

        _ => (None, None),
    };

    ErrorContext {
        error,
        suggestion,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::validate_template_content;

    #[test]
    fn test_error_display() {
        let error = YtaError::TemplateNotFound {
            id: 9,
        };
        assert_eq!(error.to_string(), "Template 9 not found");

        let error = YtaError::ApiRequestFailed {
            operation: "list templates".to_string(),
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "API request 'list templates' failed with HTTP 500: boom");
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(YtaError::SelectorClosed).with_suggestion("Try again");

        let display = format!("{ctx}");
        assert!(display.contains("Template selector closed unexpectedly"));
        assert!(display.contains("Suggestion: Try again"));
    }

    #[test]
    fn test_user_friendly_error_name_suggestions() {
        let error = anyhow::Error::from(YtaError::TemplateNameNotFound {
            name: "How-Too".to_string(),
            suggestions: vec!["How-To".to_string()],
        });

        let ctx = user_friendly_error(error);
        assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean: How-To?"));
    }

    #[test]
    fn test_user_friendly_error_invalid_template_lists_reasons() {
        let report = validate_template_content("");
        let ctx = user_friendly_error(anyhow::Error::from(YtaError::InvalidTemplate {
            report,
        }));

        let details = ctx.details.unwrap();
        assert!(details.contains("empty"));
        assert!(details.contains("placeholder"));
    }

    #[test]
    fn test_user_friendly_error_keeps_cause_chain() {
        let error = anyhow::anyhow!("root cause").context("outer operation");
        let ctx = user_friendly_error(error);
        match ctx.error {
            YtaError::Other {
                message,
            } => {
                assert!(message.contains("outer operation"));
                assert!(message.contains("root cause"));
            }
            other => panic!("Expected Other error, got {other:?}"),
        }
    }

    #[test]
    fn test_user_friendly_error_toml() {
        let toml_error = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let ctx = user_friendly_error(anyhow::Error::from(toml_error));
        assert!(matches!(ctx.error, YtaError::ConfigError { .. }));
        assert!(ctx.suggestion.is_some());
    }
}
