//! YTA - YouTube Assistant template engine
//!
//! Reusable text templates for video titles and descriptions. A template's
//! content carries `{{placeholder}}` tokens; templates are listed in a
//! dropdown, picked, and applied to a project field, with a confirmation step
//! whenever applying would overwrite something the user already wrote.
//!
//! # Architecture Overview
//!
//! - The placeholder engine extracts tokens and validates content with pure
//!   functions that never fail.
//! - A process-wide [`cache::TemplateCache`] (injected, never global) keeps
//!   template lists per type until a mutation invalidates them.
//! - The [`selector`] is a state machine with no I/O. It emits fetch and
//!   apply commands stamped with request ids, and an async driver runs those
//!   commands against collaborator traits, dropping superseded results.
//! - [`client`] implements the collaborators over the REST API.
//!
//! # Core Modules
//!
//! - [`placeholder`] - Token extraction, filling and validation rules
//! - [`models`] - Templates, projects, create and update drafts
//! - [`cache`] - Per-type template list cache with hit/miss statistics
//! - [`selector`] - Dropdown state machine, focus trap, view model, driver
//! - [`client`] - HTTP collaborators (`ApiClient`, `ProjectFieldTarget`)
//! - [`config`] - `~/.yta/config.toml`
//! - [`core`] - Error types and user-facing error formatting
//! - [`cli`] - The `yta` command-line interface
//!
//! # Example
//!
//! ```rust
//! use yta_cli::placeholder::{extract_placeholders, validate_template_content};
//!
//! let found = extract_placeholders("Top {{n}} {{topic}} tips for {{topic}}");
//! assert_eq!(found.tokens(), ["n", "topic"]);
//!
//! assert!(validate_template_content("Has {{topic}} token").valid);
//! assert!(!validate_template_content("Has {{}} empty token").valid);
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! yta validate --name "How-To" --content "How to {{action}}"
//! yta list --type title
//! yta create --type title --name "How-To" --content "How to {{action}} in {{year}}"
//! yta apply --project 3 --name "How-To" --set action="bake bread" --set year=2025
//! ```

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod core;
pub mod models;
pub mod placeholder;
pub mod selector;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
