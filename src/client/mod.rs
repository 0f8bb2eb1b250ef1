//! HTTP client for the YouTube Assistant API.
//!
//! [`ApiClient`] is the production [`TemplateSource`] and [`TemplateStore`];
//! [`ProjectFieldTarget`] is the production [`TemplateTarget`], writing the
//! project field that matches the template type.
//!
//! Every request carries the `X-Workspace-Id` header. Failures map onto
//! [`YtaError`]:
//!
//! | Response                  | Error                                   |
//! |---------------------------|-----------------------------------------|
//! | transport failure/timeout | [`YtaError::ApiUnreachable`]            |
//! | 404 on a template route   | [`YtaError::TemplateNotFound`]          |
//! | 404 on a project route    | [`YtaError::ProjectNotFound`]           |
//! | 409                       | [`YtaError::DuplicateTemplate`]         |
//! | any other non-2xx         | [`YtaError::ApiRequestFailed`]          |
//!
//! The server's `detail` field is used as the message when present.

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::config::GlobalConfig;
use crate::constants::WORKSPACE_HEADER;
use crate::core::YtaError;
use crate::models::{Project, Template, TemplateDraft, TemplatePatch, TemplateType};
use crate::selector::{TemplateSource, TemplateStore, TemplateTarget};

/// What a request addresses, used to pick the not-found error.
#[derive(Debug, Clone, Copy)]
enum Resource {
    Template(i64),
    Project(i64),
    Collection,
}

/// Client for the template and project endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    workspace_id: i64,
}

impl ApiClient {
    /// Build a client from the loaded configuration.
    pub fn from_config(config: &GlobalConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("yta/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            workspace_id: config.workspace_id,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn workspace_id(&self) -> i64 {
        self.workspace_id
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET /api/templates`, optionally filtered by type. The server returns
    /// newest first.
    pub async fn list_templates(&self, template_type: Option<TemplateType>) -> Result<Vec<Template>> {
        let mut request = self.client.get(self.endpoint("templates"));
        if let Some(template_type) = template_type {
            request = request.query(&[("type", template_type.as_str())]);
        }
        self.send("list templates", Resource::Collection, request).await
    }

    pub async fn get_template(&self, id: i64) -> Result<Template> {
        let request = self.client.get(self.endpoint(&format!("templates/{id}")));
        self.send("get template", Resource::Template(id), request).await
    }

    pub async fn create(&self, draft: &TemplateDraft) -> Result<Template> {
        let request = self.client.post(self.endpoint("templates")).json(draft);
        self.send("create template", Resource::Collection, request).await
    }

    pub async fn update(&self, id: i64, patch: &TemplatePatch) -> Result<Template> {
        let request = self.client.put(self.endpoint(&format!("templates/{id}"))).json(patch);
        self.send("update template", Resource::Template(id), request).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let request = self.client.delete(self.endpoint(&format!("templates/{id}")));
        self.execute("delete template", Resource::Template(id), request).await?;
        Ok(())
    }

    pub async fn get_project(&self, id: i64) -> Result<Project> {
        let request = self.client.get(self.endpoint(&format!("projects/{id}")));
        self.send("get project", Resource::Project(id), request).await
    }

    /// `PUT /api/projects/{id}` setting a single field.
    pub async fn update_project_field(
        &self,
        id: i64,
        field: ProjectField,
        value: &str,
    ) -> Result<Project> {
        let mut body = serde_json::Map::new();
        body.insert(field.as_str().to_string(), serde_json::Value::String(value.to_string()));
        let request = self.client.put(self.endpoint(&format!("projects/{id}"))).json(&body);
        self.send("update project", Resource::Project(id), request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        resource: Resource,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.execute(operation, resource, request).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response for '{operation}'"))
    }

    async fn execute(
        &self,
        operation: &str,
        resource: Resource,
        request: RequestBuilder,
    ) -> Result<Response> {
        let response = request
            .header(WORKSPACE_HEADER, self.workspace_id.to_string())
            .send()
            .await
            .map_err(|e| YtaError::ApiUnreachable {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        debug!("{operation}: HTTP {status}");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(operation, resource, status, &body).into())
    }
}

fn status_error(operation: &str, resource: Resource, status: StatusCode, body: &str) -> YtaError {
    let message = parse_error_detail(body).unwrap_or_else(|| {
        status.canonical_reason().unwrap_or("unexpected response").to_string()
    });

    match (status, resource) {
        (StatusCode::NOT_FOUND, Resource::Template(id)) => YtaError::TemplateNotFound {
            id,
        },
        (StatusCode::NOT_FOUND, Resource::Project(id)) => YtaError::ProjectNotFound {
            id,
        },
        (StatusCode::CONFLICT, _) => YtaError::DuplicateTemplate {
            message,
        },
        _ => YtaError::ApiRequestFailed {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        },
    }
}

/// Extract the server's error message from a JSON body.
///
/// `detail` is either a string or, for request validation failures, a list of
/// `{ "loc": [...], "msg": "..." }` objects whose messages are joined.
fn parse_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(|loc| loc.as_array())
                        .and_then(|loc| loc.last())
                        .and_then(|last| last.as_str());
                    Some(match field {
                        Some(field) => format!("{field}: {msg}"),
                        None => msg.to_string(),
                    })
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

impl TemplateSource for ApiClient {
    async fn fetch_templates(&self, template_type: TemplateType) -> Result<Vec<Template>> {
        self.list_templates(Some(template_type)).await
    }
}

impl TemplateStore for ApiClient {
    async fn create_template(&self, draft: TemplateDraft) -> Result<Template> {
        self.create(&draft).await
    }

    async fn update_template(&self, id: i64, patch: TemplatePatch) -> Result<Template> {
        self.update(id, &patch).await
    }

    async fn delete_template(&self, id: i64) -> Result<()> {
        self.delete(id).await
    }
}

/// Project field a template type is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    VideoTitle,
    Description,
}

impl ProjectField {
    #[must_use]
    pub const fn for_type(template_type: TemplateType) -> Self {
        match template_type {
            TemplateType::Title => Self::VideoTitle,
            TemplateType::Description => Self::Description,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VideoTitle => "video_title",
            Self::Description => "description",
        }
    }

    fn read(self, project: &Project) -> Option<String> {
        match self {
            Self::VideoTitle => project.video_title.clone(),
            Self::Description => project.description.clone(),
        }
    }
}

/// One field of a project as a [`TemplateTarget`].
///
/// The current value is read once on [`load`](Self::load) and kept in sync
/// with successful applies.
#[derive(Debug)]
pub struct ProjectFieldTarget {
    client: ApiClient,
    project_id: i64,
    field: ProjectField,
    current: Mutex<Option<String>>,
}

impl ProjectFieldTarget {
    pub async fn load(client: ApiClient, project_id: i64, field: ProjectField) -> Result<Self> {
        let project = client.get_project(project_id).await?;
        Ok(Self {
            current: Mutex::new(field.read(&project)),
            client,
            project_id,
            field,
        })
    }

    #[must_use]
    pub const fn project_id(&self) -> i64 {
        self.project_id
    }

    #[must_use]
    pub const fn field(&self) -> ProjectField {
        self.field
    }
}

impl TemplateTarget for ProjectFieldTarget {
    fn current_value(&self) -> Option<String> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn apply(&self, resolved: String) -> Result<()> {
        let project = self.client.update_project_field(self.project_id, self.field, &resolved).await?;
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) =
            self.field.read(&project).or(Some(resolved));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> ApiClient {
        ApiClient::from_config(&GlobalConfig {
            api_url: url.to_string(),
            workspace_id: 4,
            request_timeout_secs: 2,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let api = client("http://localhost:8000/");
        assert_eq!(api.endpoint("templates"), "http://localhost:8000/api/templates");
        assert_eq!(api.endpoint("/projects/3"), "http://localhost:8000/api/projects/3");
        assert_eq!(api.workspace_id(), 4);
    }

    #[test]
    fn test_project_field_per_type() {
        assert_eq!(ProjectField::for_type(TemplateType::Title), ProjectField::VideoTitle);
        assert_eq!(ProjectField::for_type(TemplateType::Description).as_str(), "description");
    }

    #[test]
    fn test_parse_string_detail() {
        let body = r#"{"detail": "Template with id 9 not found"}"#;
        assert_eq!(parse_error_detail(body).as_deref(), Some("Template with id 9 not found"));
    }

    #[test]
    fn test_parse_validation_detail() {
        let body = r#"{"detail": [
            {"loc": ["body", "content"], "msg": "Template must contain at least one placeholder"},
            {"loc": ["body", "name"], "msg": "Name cannot be empty"}
        ]}"#;
        assert_eq!(
            parse_error_detail(body).as_deref(),
            Some(
                "content: Template must contain at least one placeholder; name: Name cannot be empty"
            )
        );
    }

    #[test]
    fn test_parse_detail_rejects_other_bodies() {
        assert_eq!(parse_error_detail("Internal Server Error"), None);
        assert_eq!(parse_error_detail(r#"{"error": "x"}"#), None);
    }

    #[test]
    fn test_status_mapping() {
        let err = status_error("get template", Resource::Template(9), StatusCode::NOT_FOUND, "");
        assert!(matches!(err, YtaError::TemplateNotFound { id: 9 }));

        let err = status_error("get project", Resource::Project(2), StatusCode::NOT_FOUND, "");
        assert!(matches!(err, YtaError::ProjectNotFound { id: 2 }));

        let err = status_error(
            "create template",
            Resource::Collection,
            StatusCode::CONFLICT,
            r#"{"detail": "duplicate"}"#,
        );
        assert!(matches!(err, YtaError::DuplicateTemplate { ref message } if message == "duplicate"));

        let err = status_error(
            "list templates",
            Resource::Collection,
            StatusCode::SERVICE_UNAVAILABLE,
            "",
        );
        match err {
            YtaError::ApiRequestFailed {
                status,
                message,
                ..
            } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let api = client("http://127.0.0.1:1");
        let err = api.list_templates(None).await.unwrap_err();
        let yta = err.downcast_ref::<YtaError>().unwrap();
        assert!(matches!(yta, YtaError::ApiUnreachable { .. }));
    }

    #[test]
    fn test_poisoned_target_keeps_current_value() {
        let target = ProjectFieldTarget {
            client: client("http://127.0.0.1:1"),
            project_id: 1,
            field: ProjectField::VideoTitle,
            current: Mutex::new(Some("My video".to_string())),
        };

        fn panic_while_locked(current: &Mutex<Option<String>>) {
            let _guard = current.lock().unwrap();
            panic!("writer panicked while holding the lock");
        }

        let poisoned =
            std::thread::scope(|scope| scope.spawn(|| panic_while_locked(&target.current)).join());
        assert!(poisoned.is_err());
        assert!(target.current.is_poisoned());

        assert_eq!(target.current_value().as_deref(), Some("My video"));
    }
}
