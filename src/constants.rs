//! Global constants used throughout the YTA codebase.
//!
//! This module contains the template field limits, API defaults, and other
//! values that are used across multiple modules. Defining them centrally keeps
//! the local validation rules in step with the limits enforced by the server.

use std::time::Duration;

/// Maximum number of characters allowed in template content.
pub const MAX_CONTENT_LENGTH: usize = 256;

/// Maximum number of characters allowed in a template name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum number of characters allowed in a template type value.
///
/// The server stores the type in a 50 character column. Only the known
/// types are accepted locally, but the length rule is reported separately so
/// the message matches the server's.
pub const MAX_TYPE_LENGTH: usize = 50;

/// Opening delimiter of a placeholder token.
pub const PLACEHOLDER_OPEN: &str = "{{";

/// Closing delimiter of a placeholder token.
pub const PLACEHOLDER_CLOSE: &str = "}}";

/// Default base URL of the YouTube Assistant API.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Workspace used when none is configured.
///
/// The server falls back to workspace 1 when the `X-Workspace-Id` header is
/// absent; the client always sends the header explicitly.
pub const DEFAULT_WORKSPACE_ID: i64 = 1;

/// Header carrying the active workspace on every API request.
pub const WORKSPACE_HEADER: &str = "X-Workspace-Id";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default HTTP request timeout (30 seconds).
pub fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

/// Capacity of the selector driver's event queue.
pub const SELECTOR_EVENT_QUEUE: usize = 64;
