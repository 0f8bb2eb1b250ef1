//! Template list cache shared by selector sessions.
//!
//! Opening a template selector repeatedly should not refetch the template list
//! each time, but the list must not stay stale after a template is created,
//! edited, or deleted. [`TemplateCache`] keeps the last successfully fetched
//! list per [`TemplateType`] and serves it until someone explicitly
//! invalidates that type.
//!
//! # Freshness
//!
//! There is no time-based expiry. Templates change rarely relative to the
//! length of a session, so freshness is driven entirely by invalidation
//! events:
//!
//! - [`TemplateCache::put`] replaces the entry for a type and marks it fresh
//!   (last write wins).
//! - [`TemplateCache::invalidate`] flags the entry; the next
//!   [`TemplateCache::get`] misses even though the old list is still held.
//! - A failed fetch never calls `put`, so errors cannot poison the cache.
//!
//! Each type also carries a generation that every invalidation bumps. A
//! selector records the generation when it issues a fetch and stores the
//! result with [`TemplateCache::put_if_current`], so a list fetched before an
//! invalidation can never be marked fresh after it.
//!
//! Mutation call sites are expected to invalidate after a successful write;
//! [`CachedTemplateStore`](crate::selector::CachedTemplateStore) does this for
//! create, update, and delete.
//!
//! # Sharing
//!
//! One cache instance is created per application session and handed to every
//! selector as an `Arc<TemplateCache>`. Entries are replaced whole under the
//! map's per-key lock, so a reader sees either the previous list or the new
//! one, never a mix.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::models::{Template, TemplateType};

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A fresh list is cached for the type
    Hit(Vec<Template>),
    /// Nothing cached, or the cached list was invalidated
    Miss,
}

impl CacheLookup {
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    templates: Vec<Template>,
    fresh: bool,
    generation: u64,
}

/// Per-type cache of template lists.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: DashMap<TemplateType, CacheEntry>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TemplateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list for `template_type`, or [`CacheLookup::Miss`] if there is
    /// none or it has been invalidated.
    pub fn get(&self, template_type: TemplateType) -> CacheLookup {
        match self.entries.get(&template_type) {
            Some(entry) if entry.fresh => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(%template_type, count = entry.templates.len(), "template cache hit");
                CacheLookup::Hit(entry.templates.clone())
            }
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(%template_type, "template cache entry invalidated");
                CacheLookup::Miss
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(%template_type, "template cache miss");
                CacheLookup::Miss
            }
        }
    }

    /// Replace the entry for `template_type` and mark it fresh.
    pub fn put(&self, template_type: TemplateType, templates: Vec<Template>) {
        tracing::debug!(%template_type, count = templates.len(), "caching template list");
        match self.entries.entry(template_type) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.templates = templates;
                entry.fresh = true;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry {
                    templates,
                    fresh: true,
                    generation: 0,
                });
            }
        }
    }

    /// Current generation of `template_type`; bumped by every invalidation.
    #[must_use]
    pub fn generation(&self, template_type: TemplateType) -> u64 {
        self.entries.get(&template_type).map_or(0, |e| e.generation)
    }

    /// Like [`put`](Self::put), but only if `template_type` has not been
    /// invalidated since `generation` was read. Returns whether the list was
    /// stored.
    pub fn put_if_current(
        &self,
        template_type: TemplateType,
        templates: Vec<Template>,
        generation: u64,
    ) -> bool {
        match self.entries.entry(template_type) {
            Entry::Occupied(mut occupied) if occupied.get().generation == generation => {
                let entry = occupied.get_mut();
                entry.templates = templates;
                entry.fresh = true;
            }
            Entry::Vacant(vacant) if generation == 0 => {
                vacant.insert(CacheEntry {
                    templates,
                    fresh: true,
                    generation,
                });
            }
            _ => {
                tracing::debug!(%template_type, generation, "invalidated during fetch; not caching");
                return false;
            }
        }
        tracing::debug!(%template_type, generation, "caching fetched template list");
        true
    }

    /// Force the next [`get`](Self::get) for `template_type` to miss.
    ///
    /// With no entry yet, a stale marker is stored so that a fetch already in
    /// flight cannot populate the type afterwards.
    pub fn invalidate(&self, template_type: TemplateType) {
        let mut entry = self.entries.entry(template_type).or_insert_with(|| CacheEntry {
            templates: Vec::new(),
            fresh: false,
            generation: 0,
        });
        entry.fresh = false;
        entry.generation += 1;
        tracing::debug!(%template_type, generation = entry.generation, "template cache invalidated");
    }

    /// Invalidate every type.
    pub fn clear(&self) {
        for template_type in TemplateType::ALL {
            self.invalidate(template_type);
        }
        tracing::debug!("template cache cleared");
    }

    /// Whether a fresh entry exists, without counting a hit or miss.
    #[must_use]
    pub fn is_fresh(&self, template_type: TemplateType) -> bool {
        self.entries.get(&template_type).is_some_and(|e| e.fresh)
    }

    /// Cache statistics as `(hits, misses)`.
    #[must_use]
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Hit rate as a percentage.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}
