//! Test utilities for YTA
//!
//! This module provides helpers shared by unit tests and the integration
//! suite:
//! - [`init_test_logging`] to route `tracing` output through the test writer
//! - [`fixtures`] for sample templates and projects
//! - [`MemoryBackend`], an in-memory implementation of every selector
//!   collaborator with call counters, failure switches and gates for holding
//!   requests in flight
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yta_cli::cache::TemplateCache;
//! use yta_cli::models::TemplateType;
//! use yta_cli::selector::{SelectorEvent, SelectorHandle, SelectorMachine};
//! use yta_cli::test_utils::{MemoryBackend, fixtures};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let backend = Arc::new(MemoryBackend::with_templates(fixtures::sample_templates()));
//! let machine = SelectorMachine::new(TemplateType::Title, Arc::new(TemplateCache::new()));
//! let handle = SelectorHandle::spawn(machine, Arc::clone(&backend), Arc::clone(&backend));
//! handle.send(SelectorEvent::Open).await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod fixtures;

pub use backend::MemoryBackend;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Uses `level` when given, otherwise `RUST_LOG`. With neither, logging
/// stays off.
///
/// ```bash
/// RUST_LOG=yta_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
