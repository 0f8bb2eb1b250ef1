//! Core types for YTA
//!
//! The error types shared by every outer surface of the crate:
//! - [`YtaError`] - Enumerated error types covering YTA failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format

pub mod error;

pub use error::{ErrorContext, YtaError, user_friendly_error};
