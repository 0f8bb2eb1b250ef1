//! Template mutations through `CachedTemplateStore` invalidate cached lists.

use std::sync::Arc;
use yta_cli::cache::{CacheLookup, TemplateCache};
use yta_cli::core::YtaError;
use yta_cli::models::{TemplateDraft, TemplatePatch, TemplateType};
use yta_cli::selector::{CachedTemplateStore, Command, Phase, SelectorMachine, TemplateSource, TemplateStore};
use yta_cli::test_utils::{MemoryBackend, fixtures};

/// Open a selector and complete its fetch, if one is issued.
async fn open(
    store: &CachedTemplateStore<MemoryBackend>,
    template_type: TemplateType,
) -> SelectorMachine {
    let mut machine = SelectorMachine::new(template_type, Arc::clone(store.cache()));
    if let Some(Command::Fetch {
        request,
        template_type,
    }) = machine.open()
    {
        let result = store.inner().fetch_templates(template_type).await.map_err(|e| e.to_string());
        machine.complete_fetch(request, result);
    }
    assert_eq!(machine.phase(), Phase::Loaded);
    machine
}

fn store() -> CachedTemplateStore<MemoryBackend> {
    CachedTemplateStore::new(
        MemoryBackend::with_templates(fixtures::sample_templates()),
        Arc::new(TemplateCache::new()),
    )
}

#[tokio::test]
async fn test_create_invalidates_its_type() {
    let store = store();
    open(&store, TemplateType::Title).await;
    open(&store, TemplateType::Description).await;
    assert_eq!(store.inner().fetch_calls(), 2);

    let created = store
        .create_template(TemplateDraft::new("title", "Versus", "{{a}} vs {{b}}"))
        .await
        .unwrap();
    assert!(!store.cache().is_fresh(TemplateType::Title));
    assert!(store.cache().is_fresh(TemplateType::Description));

    let machine = open(&store, TemplateType::Title).await;
    assert_eq!(store.inner().fetch_calls(), 3);
    assert!(machine.templates().iter().any(|t| t.id == created.id));
}

#[tokio::test]
async fn test_update_and_delete_invalidate_every_type() {
    let store = store();
    open(&store, TemplateType::Title).await;
    open(&store, TemplateType::Description).await;

    // Moving a template to another type must refresh both lists
    let patch = TemplatePatch {
        template_type: Some("description".to_string()),
        ..Default::default()
    };
    store.update_template(1, patch).await.unwrap();
    assert!(!store.cache().is_fresh(TemplateType::Title));
    assert!(!store.cache().is_fresh(TemplateType::Description));

    let titles = open(&store, TemplateType::Title).await;
    assert!(titles.templates().iter().all(|t| t.id != 1));
    let descriptions = open(&store, TemplateType::Description).await;
    assert!(descriptions.templates().iter().any(|t| t.id == 1));

    store.delete_template(2).await.unwrap();
    assert!(!store.cache().is_fresh(TemplateType::Title));
    let titles = open(&store, TemplateType::Title).await;
    assert!(titles.templates().is_empty());
}

#[tokio::test]
async fn test_failed_mutation_keeps_cache() {
    let store = store();
    open(&store, TemplateType::Title).await;

    let err = store
        .create_template(TemplateDraft::new("title", "Copy", "  HOW TO {{ACTION}} IN {{YEAR}} "))
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<YtaError>(), Some(YtaError::DuplicateTemplate { .. })));

    let err = store.delete_template(404).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<YtaError>(), Some(YtaError::TemplateNotFound { id: 404 })));

    assert!(store.cache().is_fresh(TemplateType::Title));
    open(&store, TemplateType::Title).await;
    assert_eq!(store.inner().fetch_calls(), 1);
}

#[test]
fn test_invalidated_entry_is_never_served() {
    let cache = Arc::new(TemplateCache::new());
    cache.put(TemplateType::Title, fixtures::sample_templates());
    assert!(cache.get(TemplateType::Title).is_hit());

    cache.invalidate(TemplateType::Title);
    assert!(matches!(cache.get(TemplateType::Title), CacheLookup::Miss));
    assert!(matches!(cache.get(TemplateType::Title), CacheLookup::Miss));

    let mut machine = SelectorMachine::new(TemplateType::Title, Arc::clone(&cache));
    assert!(matches!(machine.open(), Some(Command::Fetch { .. })));
    assert_eq!(machine.phase(), Phase::Loading);
    assert!(machine.templates().is_empty());
}

#[tokio::test]
async fn test_mutation_during_fetch_keeps_entry_invalid() {
    let store = store();
    open(&store, TemplateType::Title).await;
    store.cache().invalidate(TemplateType::Title);

    let mut machine = SelectorMachine::new(TemplateType::Title, Arc::clone(store.cache()));
    let Some(Command::Fetch {
        request,
        ..
    }) = machine.open()
    else {
        panic!("expected a fetch");
    };
    // The server answers with the list as it was before the create lands
    let before = store.inner().fetch_templates(TemplateType::Title).await.unwrap();
    store.create_template(TemplateDraft::new("title", "Versus", "{{a}} vs {{b}}")).await.unwrap();
    machine.complete_fetch(request, Ok(before));

    assert_eq!(machine.phase(), Phase::Loaded);
    assert_eq!(machine.templates().len(), 2);
    assert!(!store.cache().is_fresh(TemplateType::Title));

    let reopened = open(&store, TemplateType::Title).await;
    assert_eq!(reopened.templates().len(), 3);
}

#[tokio::test]
async fn test_create_during_first_fetch_is_not_lost() {
    let store = store();
    let mut machine = SelectorMachine::new(TemplateType::Title, Arc::clone(store.cache()));
    let Some(Command::Fetch {
        request,
        ..
    }) = machine.open()
    else {
        panic!("expected a fetch");
    };

    let before = store.inner().fetch_templates(TemplateType::Title).await.unwrap();
    let created = store
        .create_template(TemplateDraft::new("title", "Versus", "{{a}} vs {{b}}"))
        .await
        .unwrap();
    machine.complete_fetch(request, Ok(before));
    assert!(matches!(store.cache().get(TemplateType::Title), CacheLookup::Miss));

    let reopened = open(&store, TemplateType::Title).await;
    assert!(reopened.templates().iter().any(|t| t.id == created.id));
}
