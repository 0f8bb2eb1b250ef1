//! Integration test suite for YTA
//!
//! End-to-end tests of the selector workflow against in-memory
//! collaborators, cache invalidation through the store wrapper, and the
//! offline CLI commands.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **selector_workflow**: Open, select, confirm and apply through the async driver
//! - **cache_invalidation**: Template mutations invalidate cached lists
//! - **cli**: `yta` binary behavior for commands that need no server

mod cache_invalidation;
mod cli;
mod selector_workflow;
