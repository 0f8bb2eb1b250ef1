//! Selector sessions driven end to end through `SelectorHandle`.

use std::collections::HashMap;
use std::sync::Arc;
use yta_cli::cache::TemplateCache;
use yta_cli::models::TemplateType;
use yta_cli::selector::{
    DialogControl, DismissReason, DropdownView, Key, Phase, SelectorEvent, SelectorHandle,
    SelectorMachine, TemplateTarget,
};
use yta_cli::test_utils::{MemoryBackend, fixtures, init_test_logging};

fn session(backend: &Arc<MemoryBackend>, cache: &Arc<TemplateCache>) -> SelectorHandle {
    init_test_logging(None);
    let machine = SelectorMachine::new(TemplateType::Title, Arc::clone(cache));
    SelectorHandle::spawn(machine, Arc::clone(backend), Arc::clone(backend))
}

async fn open_loaded(handle: &mut SelectorHandle) {
    handle.send(SelectorEvent::Open).await.unwrap();
    handle.wait_for(|s| s.phase == Phase::Loaded).await.unwrap();
}

async fn select(handle: &SelectorHandle, template_id: i64) {
    handle
        .send(SelectorEvent::Select {
            template_id,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_second_open_is_served_from_cache() {
    let backend = Arc::new(MemoryBackend::with_templates(fixtures::sample_templates()));
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    open_loaded(&mut handle).await;
    handle.send(SelectorEvent::Dismiss(DismissReason::OutsideClick)).await.unwrap();
    handle.wait_for(|s| s.phase == Phase::Closed).await.unwrap();
    open_loaded(&mut handle).await;

    // A second session sharing the cache does not fetch either
    let mut other = session(&backend, &cache);
    open_loaded(&mut other).await;

    assert_eq!(backend.fetch_calls(), 1);
    assert_eq!(other.snapshot().templates.len(), 2);
}

#[tokio::test]
async fn test_empty_target_applies_without_confirmation() {
    let backend = Arc::new(MemoryBackend::with_templates(fixtures::sample_templates()));
    backend.hold_applies();
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    open_loaded(&mut handle).await;
    select(&handle, 1).await;

    let applying = handle.wait_for(|s| s.phase != Phase::Loaded).await.unwrap();
    assert_eq!(applying.phase, Phase::Applying);
    assert!(applying.pending_selection.is_none());
    assert!(applying.view.items().iter().all(|item| item.disabled));

    backend.release_applies(1);
    let done = handle.wait_for(|s| s.applied == Some(1)).await.unwrap();
    assert_eq!(done.phase, Phase::Closed);
    assert_eq!(backend.applied(), vec!["How to {{action}} in {{year}}".to_string()]);
}

#[tokio::test]
async fn test_whitespace_target_counts_as_empty() {
    let backend = Arc::new(
        MemoryBackend::with_templates(fixtures::sample_templates()).with_current_value("   "),
    );
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    open_loaded(&mut handle).await;
    select(&handle, 2).await;

    handle.wait_for(|s| s.applied == Some(2)).await.unwrap();
    assert_eq!(backend.apply_calls(), 1);
}

#[tokio::test]
async fn test_rapid_confirms_apply_once() {
    let backend = Arc::new(
        MemoryBackend::with_templates(fixtures::sample_templates()).with_current_value("Old title"),
    );
    backend.hold_applies();
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    open_loaded(&mut handle).await;
    select(&handle, 1).await;
    let confirming = handle.wait_for(|s| s.phase == Phase::Confirming).await.unwrap();
    assert_eq!(confirming.focused, Some(DialogControl::Replace));
    assert_eq!(confirming.view.confirmation().unwrap().current_value, "Old title");

    for _ in 0..3 {
        handle.send(SelectorEvent::Confirm).await.unwrap();
    }
    backend.release_applies(3);

    let done = handle.wait_for(|s| s.applied == Some(1)).await.unwrap();
    assert_eq!(done.phase, Phase::Closed);
    assert_eq!(backend.apply_calls(), 1);
    assert_eq!(backend.current_value().as_deref(), Some("How to {{action}} in {{year}}"));
}

#[tokio::test]
async fn test_apply_failure_keeps_list_with_inline_error() {
    let backend = Arc::new(MemoryBackend::with_templates(fixtures::sample_templates()));
    backend.fail_applies(true);
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    open_loaded(&mut handle).await;
    select(&handle, 1).await;

    let failed = handle.wait_for(|s| s.last_error.is_some()).await.unwrap();
    assert_eq!(failed.phase, Phase::Loaded);
    assert_eq!(failed.applied, None);
    match &failed.view {
        DropdownView::List {
            items,
            inline_error,
            ..
        } => {
            assert_eq!(items.len(), 2);
            assert!(items.iter().all(|item| !item.disabled));
            assert!(inline_error.as_deref().unwrap().contains("failed to save video title"));
        }
        other => panic!("expected list view, got {other:?}"),
    }

    // Retrying from the same list works once the target recovers
    backend.fail_applies(false);
    select(&handle, 1).await;
    let done = handle.wait_for(|s| s.applied == Some(1)).await.unwrap();
    assert_eq!(done.last_error, None);
    assert_eq!(backend.apply_calls(), 2);
}

#[tokio::test]
async fn test_escape_cancels_confirmation_then_closes() {
    let backend = Arc::new(
        MemoryBackend::with_templates(fixtures::sample_templates()).with_current_value("Mine"),
    );
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    open_loaded(&mut handle).await;
    select(&handle, 1).await;
    handle.wait_for(|s| s.phase == Phase::Confirming).await.unwrap();

    handle.send(SelectorEvent::Key(Key::Escape)).await.unwrap();
    let back = handle.wait_for(|s| s.phase == Phase::Loaded).await.unwrap();
    assert!(back.pending_selection.is_none());
    assert!(back.view.confirmation().is_none());

    handle.send(SelectorEvent::Key(Key::Escape)).await.unwrap();
    handle.wait_for(|s| s.phase == Phase::Closed).await.unwrap();

    open_loaded(&mut handle).await;
    let reopened = handle.snapshot();
    assert!(reopened.view.confirmation().is_none());
    assert!(reopened.pending_selection.is_none());
    assert_eq!(backend.apply_calls(), 0);
    assert_eq!(backend.current_value().as_deref(), Some("Mine"));
}

#[tokio::test]
async fn test_keyboard_focus_trap_and_enter() {
    let backend = Arc::new(
        MemoryBackend::with_templates(fixtures::sample_templates()).with_current_value("Mine"),
    );
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    open_loaded(&mut handle).await;
    select(&handle, 2).await;
    handle.wait_for(|s| s.phase == Phase::Confirming).await.unwrap();

    handle.send(SelectorEvent::Key(Key::Tab)).await.unwrap();
    let state = handle.wait_for(|s| s.focused == Some(DialogControl::Cancel)).await.unwrap();
    assert_eq!(state.phase, Phase::Confirming);

    handle.send(SelectorEvent::Key(Key::ShiftTab)).await.unwrap();
    handle.wait_for(|s| s.focused == Some(DialogControl::Replace)).await.unwrap();

    handle.send(SelectorEvent::Key(Key::Enter)).await.unwrap();
    handle.wait_for(|s| s.applied == Some(2)).await.unwrap();
    assert_eq!(backend.applied(), vec!["Top {{n}} {{topic}} tips".to_string()]);
}

#[tokio::test]
async fn test_dismiss_and_select_ignored_while_applying() {
    let backend = Arc::new(MemoryBackend::with_templates(fixtures::sample_templates()));
    backend.hold_applies();
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    open_loaded(&mut handle).await;
    select(&handle, 1).await;
    handle.wait_for(|s| s.phase == Phase::Applying).await.unwrap();

    handle.send(SelectorEvent::Dismiss(DismissReason::Escape)).await.unwrap();
    handle.send(SelectorEvent::Dismiss(DismissReason::OutsideClick)).await.unwrap();
    select(&handle, 2).await;
    backend.release_applies(2);

    let done = handle.wait_for(|s| s.applied.is_some()).await.unwrap();
    assert_eq!(done.applied, Some(1));
    assert_eq!(backend.apply_calls(), 1);
}

#[tokio::test]
async fn test_fetch_failure_then_retry() {
    let backend = Arc::new(MemoryBackend::with_templates(fixtures::sample_templates()));
    backend.fail_fetches(true);
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    handle.send(SelectorEvent::Open).await.unwrap();
    let failed = handle.wait_for(|s| s.phase == Phase::Error).await.unwrap();
    assert!(matches!(failed.view, DropdownView::Error { .. }));
    assert!(!cache.is_fresh(TemplateType::Title));

    backend.fail_fetches(false);
    open_loaded(&mut handle).await;
    assert_eq!(backend.fetch_calls(), 2);
    assert!(cache.is_fresh(TemplateType::Title));
}

#[tokio::test]
async fn test_late_fetch_after_close_is_dropped() {
    let backend = Arc::new(MemoryBackend::with_templates(fixtures::sample_templates()));
    backend.hold_fetches();
    let cache = Arc::new(TemplateCache::new());
    let mut handle = session(&backend, &cache);

    handle.send(SelectorEvent::Open).await.unwrap();
    handle.wait_for(|s| s.phase == Phase::Loading).await.unwrap();
    handle.send(SelectorEvent::Dismiss(DismissReason::Explicit)).await.unwrap();
    handle.wait_for(|s| s.phase == Phase::Closed).await.unwrap();

    backend.release_fetches(1);
    // Shutdown waits for the in-flight fetch to report back
    let machine = handle.shutdown().await.unwrap();

    assert_eq!(machine.phase(), Phase::Closed);
    assert!(machine.templates().is_empty());
    assert!(!cache.is_fresh(TemplateType::Title));
}

#[tokio::test]
async fn test_placeholder_values_fill_applied_content() {
    let backend = Arc::new(MemoryBackend::with_templates(fixtures::sample_templates()));
    let cache = Arc::new(TemplateCache::new());
    let values = HashMap::from([
        ("action".to_string(), "bake bread".to_string()),
        ("year".to_string(), "2025".to_string()),
    ]);
    let machine = SelectorMachine::new(TemplateType::Title, Arc::clone(&cache)).with_values(values);
    let mut handle = SelectorHandle::spawn(machine, Arc::clone(&backend), Arc::clone(&backend));

    open_loaded(&mut handle).await;
    select(&handle, 1).await;
    handle.wait_for(|s| s.applied == Some(1)).await.unwrap();

    assert_eq!(backend.applied(), vec!["How to bake bread in 2025".to_string()]);
}
