//! In-memory selector collaborators.

use anyhow::{Result, bail};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use tokio::sync::Semaphore;

use super::fixtures::timestamp;
use crate::constants::DEFAULT_WORKSPACE_ID;
use crate::core::YtaError;
use crate::models::{Template, TemplateDraft, TemplatePatch, TemplateType, find_duplicate_content};
use crate::selector::{TemplateSource, TemplateStore, TemplateTarget};

/// A template list, a single target field and a template store in one value.
///
/// Fetches and applies can be held in flight with [`hold_fetches`] and
/// [`hold_applies`]; each `release_*` call lets that many through.
///
/// [`hold_fetches`]: MemoryBackend::hold_fetches
/// [`hold_applies`]: MemoryBackend::hold_applies
#[derive(Debug)]
pub struct MemoryBackend {
    templates: Mutex<Vec<Template>>,
    next_id: AtomicI64,
    current: Mutex<Option<String>>,
    applied: Mutex<Vec<String>>,
    fetch_calls: AtomicUsize,
    apply_calls: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_apply: AtomicBool,
    hold_fetch: AtomicBool,
    hold_apply: AtomicBool,
    fetch_gate: Semaphore,
    apply_gate: Semaphore,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::with_templates(Vec::new())
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: Vec<Template>) -> Self {
        let next_id = templates.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            templates: Mutex::new(templates),
            next_id: AtomicI64::new(next_id),
            current: Mutex::new(None),
            applied: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
            apply_calls: AtomicUsize::new(0),
            fail_fetch: AtomicBool::new(false),
            fail_apply: AtomicBool::new(false),
            hold_fetch: AtomicBool::new(false),
            hold_apply: AtomicBool::new(false),
            fetch_gate: Semaphore::new(0),
            apply_gate: Semaphore::new(0),
        }
    }

    /// Set the target field's current value.
    #[must_use]
    pub fn with_current_value(self, value: &str) -> Self {
        self.set_current_value(Some(value));
        self
    }

    pub fn set_current_value(&self, value: Option<&str>) {
        *self.current.lock().unwrap() = value.map(str::to_string);
    }

    pub fn templates(&self) -> Vec<Template> {
        self.templates.lock().unwrap().clone()
    }

    /// Every value written through [`TemplateTarget::apply`], oldest first.
    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_applies(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    pub fn hold_fetches(&self) {
        self.hold_fetch.store(true, Ordering::SeqCst);
    }

    pub fn release_fetches(&self, count: usize) {
        self.fetch_gate.add_permits(count);
    }

    pub fn hold_applies(&self) {
        self.hold_apply.store(true, Ordering::SeqCst);
    }

    pub fn release_applies(&self, count: usize) {
        self.apply_gate.add_permits(count);
    }

    async fn pass(held: &AtomicBool, gate: &Semaphore) -> Result<()> {
        if held.load(Ordering::SeqCst) {
            gate.acquire().await?.forget();
        }
        Ok(())
    }
}

impl TemplateSource for MemoryBackend {
    async fn fetch_templates(&self, template_type: TemplateType) -> Result<Vec<Template>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.hold_fetch, &self.fetch_gate).await?;
        if self.fail_fetch.load(Ordering::SeqCst) {
            bail!("template service unavailable");
        }
        Ok(self
            .templates
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.template_type == template_type)
            .cloned()
            .collect())
    }
}

impl TemplateTarget for MemoryBackend {
    fn current_value(&self) -> Option<String> {
        self.current.lock().unwrap().clone()
    }

    async fn apply(&self, resolved: String) -> Result<()> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.hold_apply, &self.apply_gate).await?;
        if self.fail_apply.load(Ordering::SeqCst) {
            bail!("failed to save video title");
        }
        self.applied.lock().unwrap().push(resolved.clone());
        *self.current.lock().unwrap() = Some(resolved);
        Ok(())
    }
}

impl TemplateStore for MemoryBackend {
    async fn create_template(&self, draft: TemplateDraft) -> Result<Template> {
        let draft = draft.normalize();
        let report = draft.validate();
        if !report.valid {
            return Err(YtaError::InvalidTemplate {
                report,
            }
            .into());
        }
        let template_type = draft.parsed_type()?;

        let mut templates = self.templates.lock().unwrap();
        if find_duplicate_content(&templates, template_type, &draft.content, None).is_some() {
            return Err(YtaError::DuplicateTemplate {
                message: format!("A {template_type} template with this content already exists"),
            }
            .into());
        }

        let template = Template {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            template_type,
            name: draft.name,
            content: draft.content,
            workspace_id: DEFAULT_WORKSPACE_ID,
            created_at: timestamp(),
            updated_at: timestamp(),
        };
        templates.push(template.clone());
        Ok(template)
    }

    async fn update_template(&self, id: i64, patch: TemplatePatch) -> Result<Template> {
        let patch = patch.normalize();
        let report = patch.validate();
        if !report.valid {
            return Err(YtaError::InvalidTemplate {
                report,
            }
            .into());
        }

        let mut templates = self.templates.lock().unwrap();
        let Some(index) = templates.iter().position(|t| t.id == id) else {
            return Err(YtaError::TemplateNotFound {
                id,
            }
            .into());
        };
        let mut updated = templates[index].clone();
        if let Some(template_type) = &patch.template_type {
            updated.template_type = template_type.parse()?;
        }
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(content) = patch.content {
            updated.content = content;
        }
        if find_duplicate_content(&templates, updated.template_type, &updated.content, Some(id))
            .is_some()
        {
            return Err(YtaError::DuplicateTemplate {
                message: format!(
                    "A {} template with this content already exists",
                    updated.template_type
                ),
            }
            .into());
        }
        templates[index] = updated.clone();
        Ok(updated)
    }

    async fn delete_template(&self, id: i64) -> Result<()> {
        let mut templates = self.templates.lock().unwrap();
        let before = templates.len();
        templates.retain(|t| t.id != id);
        if templates.len() == before {
            return Err(YtaError::TemplateNotFound {
                id,
            }
            .into());
        }
        Ok(())
    }
}
