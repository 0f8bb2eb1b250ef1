//! Placeholder engine for template content.
//!
//! Template content is free text with fill-in points written as
//! `{{identifier}}`. This module owns the rules for those tokens:
//!
//! - [`extract_placeholders`] scans content and returns the unique tokens in
//!   order of first appearance, along with a count of empty tokens (`{{}}`,
//!   `{{   }}`) so callers can flag them instead of losing them.
//! - [`validate_template_content`], [`validate_template_name`] and
//!   [`validate_template_type`] check the creation/edit invariants and report
//!   every failed rule as a [`ValidationIssue`].
//! - [`fill_placeholders`] substitutes known tokens with values.
//!
//! Everything here is pure and synchronous. Nothing returns an error: an
//! invalid input produces a [`ValidationReport`] with `valid == false`, which
//! lets a form keep its submit control disabled and render one message per
//! violated rule without a round trip to the server.
//!
//! # Examples
//!
//! ```rust
//! use yta_cli::placeholder::{extract_placeholders, validate_template_content};
//!
//! let found = extract_placeholders("{{topic}} in {{year}}: {{topic}}");
//! assert_eq!(found.tokens(), ["topic", "year"]);
//!
//! assert!(validate_template_content("Has {{topic}} token").valid);
//! assert!(!validate_template_content("Has {{}} empty token").valid);
//! ```

mod scan;
mod validation;

pub use scan::{Placeholders, extract_placeholders, fill_placeholders};
pub use validation::{
    ValidationIssue, ValidationReport, validate_template_content, validate_template_name,
    validate_template_type,
};
