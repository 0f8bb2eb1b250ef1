//! Collaborator contracts consumed by the selector.
//!
//! The selector never talks HTTP itself. It needs something that lists
//! templates ([`TemplateSource`]) and something that owns the field being
//! written ([`TemplateTarget`]). Template mutations go through
//! [`TemplateStore`]; wrapping a store in [`CachedTemplateStore`] makes every
//! successful mutation invalidate the shared [`TemplateCache`] so the next
//! dropdown open refetches.

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;

use crate::cache::TemplateCache;
use crate::models::{Template, TemplateDraft, TemplatePatch, TemplateType};

/// Lists templates of one type.
pub trait TemplateSource: Send + Sync + 'static {
    /// Fetch every template of `template_type` in the active workspace.
    fn fetch_templates(
        &self,
        template_type: TemplateType,
    ) -> impl Future<Output = Result<Vec<Template>>> + Send;
}

/// The field a template is applied to, e.g. a project's video title.
pub trait TemplateTarget: Send + Sync + 'static {
    /// Value the field holds right now; `None` when unset.
    fn current_value(&self) -> Option<String>;

    /// Persist `resolved` into the field.
    fn apply(&self, resolved: String) -> impl Future<Output = Result<()>> + Send;
}

/// Create, update and delete templates.
pub trait TemplateStore: Send + Sync {
    fn create_template(&self, draft: TemplateDraft) -> impl Future<Output = Result<Template>> + Send;

    fn update_template(
        &self,
        id: i64,
        patch: TemplatePatch,
    ) -> impl Future<Output = Result<Template>> + Send;

    fn delete_template(&self, id: i64) -> impl Future<Output = Result<()>> + Send;
}

/// A [`TemplateStore`] that invalidates the cache after each successful write.
///
/// Creation invalidates the created template's type. Updates and deletes
/// invalidate every type, since the template's previous type is not known to
/// the caller. Failed writes leave the cache untouched.
#[derive(Debug)]
pub struct CachedTemplateStore<S> {
    inner: S,
    cache: Arc<TemplateCache>,
}

impl<S: TemplateStore> CachedTemplateStore<S> {
    pub fn new(inner: S, cache: Arc<TemplateCache>) -> Self {
        Self {
            inner,
            cache,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &Arc<TemplateCache> {
        &self.cache
    }
}

impl<S: TemplateStore> TemplateStore for CachedTemplateStore<S> {
    async fn create_template(&self, draft: TemplateDraft) -> Result<Template> {
        let created = self.inner.create_template(draft).await?;
        self.cache.invalidate(created.template_type);
        Ok(created)
    }

    async fn update_template(&self, id: i64, patch: TemplatePatch) -> Result<Template> {
        let updated = self.inner.update_template(id, patch).await?;
        self.cache.clear();
        Ok(updated)
    }

    async fn delete_template(&self, id: i64) -> Result<()> {
        self.inner.delete_template(id).await?;
        self.cache.clear();
        Ok(())
    }
}
