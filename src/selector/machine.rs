//! Selector state machine.
//!
//! [`SelectorMachine`] holds only session state and transition logic. It does
//! no I/O: operations that need a collaborator return a [`Command`] stamped
//! with a [`RequestId`], and the caller reports the outcome back through
//! [`SelectorMachine::complete_fetch`] or [`SelectorMachine::complete_apply`].
//! This keeps every transition unit-testable by driving methods, and lets the
//! async [`driver`](super::driver) run the commands however it likes.
//!
//! ```text
//! Closed ──open──▶ Loading ──ok──▶ Loaded ──select (target empty)──▶ Applying
//!    │  (cache hit)   │                │                               │  │
//!    └──────────────────────────────▶ │ ──select (target set)──▶ Confirming
//!                     └─err─▶ Error   ◀──cancel / Escape─────────────┘  │
//!                                      ◀──────────apply failed──────────┘
//!                          Closed ◀───────────apply ok───────────────────┘
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::dropdown::{ConfirmationProps, DropdownProps, DropdownView, render_dropdown};
use super::focus::{DialogControl, FocusTrap, Key};
use crate::cache::{CacheLookup, TemplateCache};
use crate::models::{Template, TemplateType};
use crate::placeholder::fill_placeholders;

/// Interaction phase of a selector session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Closed,
    Loading,
    Loaded,
    Error,
    Confirming,
    Applying,
}

impl Phase {
    /// Whether the dropdown (or its dialog) is visible.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Phase::Closed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifies one collaborator request. A completion is committed only if it
/// carries the id of the request currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work the caller must perform on the machine's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the template list for `template_type`
    Fetch {
        request: RequestId,
        template_type: TemplateType,
    },
    /// Write `content` into the target field
    Apply {
        request: RequestId,
        template_id: i64,
        content: String,
    },
}

impl Command {
    #[must_use]
    pub const fn request(&self) -> RequestId {
        match self {
            Command::Fetch {
                request,
                ..
            }
            | Command::Apply {
                request,
                ..
            } => *request,
        }
    }
}

/// Gesture that asks the dropdown to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Escape,
    OutsideClick,
    Explicit,
}

/// A selection evaluated against the target field's current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The target is empty; nothing would be lost
    ApplyDirectly(Template),
    /// The target holds `current`, which applying would replace
    RequireConfirmation {
        template: Template,
        current: String,
    },
}

/// Decide whether applying `template` needs confirmation. A value that is
/// empty after trimming counts as empty.
#[must_use]
pub fn evaluate_selection(template: Template, current_value: Option<&str>) -> SelectionOutcome {
    match current_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(current) => SelectionOutcome::RequireConfirmation {
            template,
            current: current.to_string(),
        },
        None => SelectionOutcome::ApplyDirectly(template),
    }
}

#[derive(Debug, Clone)]
struct PendingSelection {
    template: Template,
    current: String,
    focus: FocusTrap<DialogControl>,
}

/// State of one template selector bound to a target field.
#[derive(Debug)]
pub struct SelectorMachine {
    template_type: TemplateType,
    cache: Arc<TemplateCache>,
    values: HashMap<String, String>,
    phase: Phase,
    templates: Vec<Template>,
    pending: Option<PendingSelection>,
    last_error: Option<String>,
    in_flight: Option<RequestId>,
    next_request: u64,
    /// Cache generation observed when the current fetch was issued
    fetch_generation: u64,
}

impl SelectorMachine {
    /// Create a closed selector for `template_type` backed by `cache`.
    #[must_use]
    pub fn new(template_type: TemplateType, cache: Arc<TemplateCache>) -> Self {
        Self {
            template_type,
            cache,
            values: HashMap::new(),
            phase: Phase::Closed,
            templates: Vec::new(),
            pending: None,
            last_error: None,
            in_flight: None,
            next_request: 0,
            fetch_generation: 0,
        }
    }

    /// Values substituted into placeholders before applying. Without values
    /// the template content is applied as written.
    #[must_use]
    pub fn with_values(mut self, values: HashMap<String, String>) -> Self {
        self.values = values;
        self
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn template_type(&self) -> TemplateType {
        self.template_type
    }

    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// The template awaiting confirmation; only set while `Confirming`.
    #[must_use]
    pub fn pending_selection(&self) -> Option<&Template> {
        self.pending.as_ref().map(|p| &p.template)
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Focused dialog control; only set while `Confirming`.
    #[must_use]
    pub fn focused(&self) -> Option<DialogControl> {
        self.pending.as_ref().map(|p| p.focus.focused())
    }

    #[must_use]
    pub const fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    #[must_use]
    pub const fn is_applying(&self) -> bool {
        matches!(self.phase, Phase::Applying)
    }

    /// Open the dropdown, or retry after a fetch error.
    ///
    /// Clears any error and pending selection from earlier attempts. Serves the
    /// cached list when it is fresh; otherwise returns a [`Command::Fetch`].
    /// Ignored while the dropdown is already open and healthy.
    pub fn open(&mut self) -> Option<Command> {
        if !matches!(self.phase, Phase::Closed | Phase::Error) {
            tracing::trace!(phase = %self.phase, "open ignored; selector already open");
            return None;
        }

        self.last_error = None;
        self.pending = None;
        self.in_flight = None;

        match self.cache.get(self.template_type) {
            CacheLookup::Hit(templates) => {
                self.templates = templates;
                self.transition(Phase::Loaded);
                None
            }
            CacheLookup::Miss => {
                self.templates.clear();
                self.fetch_generation = self.cache.generation(self.template_type);
                self.transition(Phase::Loading);
                let request = self.issue_request();
                Some(Command::Fetch {
                    request,
                    template_type: self.template_type,
                })
            }
        }
    }

    /// Report the outcome of a [`Command::Fetch`].
    ///
    /// Results for a superseded request (the session was closed or reopened
    /// meanwhile) are dropped without touching state or the cache.
    pub fn complete_fetch(&mut self, request: RequestId, result: Result<Vec<Template>, String>) {
        if !self.accepts(request, Phase::Loading) {
            tracing::debug!(%request, phase = %self.phase, "dropping superseded fetch result");
            return;
        }
        self.in_flight = None;

        match result {
            Ok(templates) => {
                // The session shows the list even if the cache refuses it
                self.cache.put_if_current(self.template_type, templates.clone(), self.fetch_generation);
                self.templates = templates;
                self.transition(Phase::Loaded);
            }
            Err(message) => {
                tracing::warn!(template_type = %self.template_type, "failed to load templates: {message}");
                self.last_error = Some(message);
                self.transition(Phase::Error);
            }
        }
    }

    /// The user picked `template_id`; `current_value` is the target field's
    /// value right now.
    ///
    /// Applies immediately when the target is empty, otherwise enters
    /// `Confirming` with focus on "Replace". Only honoured while `Loaded`, so
    /// selections made while an apply is in flight are ignored.
    pub fn select(&mut self, template_id: i64, current_value: Option<&str>) -> Option<Command> {
        if self.phase != Phase::Loaded {
            tracing::debug!(template_id, phase = %self.phase, "selection ignored");
            return None;
        }
        let Some(template) = self
            .templates
            .iter()
            .find(|t| t.id == template_id && t.template_type == self.template_type)
            .cloned()
        else {
            tracing::warn!(template_id, "selected template is not in the loaded list");
            return None;
        };
        self.last_error = None;

        match evaluate_selection(template, current_value) {
            SelectionOutcome::ApplyDirectly(template) => Some(self.start_apply(template)),
            SelectionOutcome::RequireConfirmation {
                template,
                current,
            } => {
                self.pending = Some(PendingSelection {
                    template,
                    current,
                    focus: FocusTrap::confirmation(),
                });
                self.transition(Phase::Confirming);
                None
            }
        }
    }

    /// Confirm the pending replacement. Every trigger after the first is
    /// ignored until the in-flight apply resolves.
    pub fn confirm(&mut self) -> Option<Command> {
        if self.phase != Phase::Confirming {
            tracing::debug!(phase = %self.phase, in_flight = ?self.in_flight, "confirm ignored");
            return None;
        }
        let pending = self.pending.take()?;
        Some(self.start_apply(pending.template))
    }

    /// Cancel the confirmation dialog and return to the list.
    pub fn cancel(&mut self) {
        if self.phase != Phase::Confirming {
            return;
        }
        self.pending = None;
        self.transition(Phase::Loaded);
    }

    /// Close the dropdown in response to a dismiss gesture.
    ///
    /// Ignored while applying so an in-flight write cannot be abandoned.
    /// Escape inside the confirmation dialog only cancels the dialog.
    pub fn dismiss(&mut self, reason: DismissReason) {
        match (self.phase, reason) {
            (Phase::Closed, _) => {}
            (Phase::Applying, _) => {
                tracing::debug!(?reason, "dismiss ignored while applying");
            }
            (Phase::Confirming, DismissReason::Escape) => self.cancel(),
            _ => self.close(),
        }
    }

    /// Keyboard input. Tab/Shift+Tab/Enter act only inside the confirmation
    /// dialog; Escape is routed to [`dismiss`](Self::dismiss).
    pub fn handle_key(&mut self, key: Key) -> Option<Command> {
        if key == Key::Escape {
            self.dismiss(DismissReason::Escape);
            return None;
        }
        if self.phase != Phase::Confirming {
            return None;
        }

        let pending = self.pending.as_mut()?;
        match key {
            Key::Tab => {
                pending.focus.next();
                None
            }
            Key::ShiftTab => {
                pending.focus.prev();
                None
            }
            Key::Enter => match pending.focus.focused() {
                DialogControl::Cancel => {
                    self.cancel();
                    None
                }
                DialogControl::Replace => self.confirm(),
            },
            Key::Escape => None,
        }
    }

    /// Report the outcome of a [`Command::Apply`].
    ///
    /// Success tears the session down. Failure returns to `Loaded` with
    /// `last_error` set and the list intact so the user can retry.
    pub fn complete_apply(&mut self, request: RequestId, result: Result<(), String>) {
        if !self.accepts(request, Phase::Applying) {
            tracing::debug!(%request, phase = %self.phase, "dropping superseded apply result");
            return;
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                tracing::info!(template_type = %self.template_type, "template applied");
                self.close();
            }
            Err(message) => {
                tracing::warn!("failed to apply template: {message}");
                self.last_error = Some(message);
                self.transition(Phase::Loaded);
            }
        }
    }

    /// Props for the presentation layer.
    #[must_use]
    pub fn props(&self) -> DropdownProps<'_> {
        DropdownProps {
            open: self.phase.is_open(),
            template_type: self.template_type,
            templates: &self.templates,
            loading: self.phase == Phase::Loading,
            error: (self.phase == Phase::Error).then(|| self.last_error.as_deref()).flatten(),
            inline_error: (self.phase != Phase::Error).then(|| self.last_error.as_deref()).flatten(),
            is_applying: self.is_applying(),
            confirmation: self.pending.as_ref().map(|p| ConfirmationProps {
                template: &p.template,
                current_value: &p.current,
                focused: p.focus.focused(),
            }),
        }
    }

    /// Render the current state.
    #[must_use]
    pub fn view(&self) -> DropdownView {
        render_dropdown(&self.props())
    }

    fn start_apply(&mut self, template: Template) -> Command {
        let content = fill_placeholders(&template.content, &self.values);
        let request = self.issue_request();
        self.pending = None;
        self.transition(Phase::Applying);
        tracing::debug!(%request, template_id = template.id, "applying template");
        Command::Apply {
            request,
            template_id: template.id,
            content,
        }
    }

    fn close(&mut self) {
        self.templates.clear();
        self.pending = None;
        self.last_error = None;
        self.in_flight = None;
        self.transition(Phase::Closed);
    }

    fn issue_request(&mut self) -> RequestId {
        self.next_request += 1;
        let request = RequestId(self.next_request);
        self.in_flight = Some(request);
        request
    }

    fn accepts(&self, request: RequestId, phase: Phase) -> bool {
        self.phase == phase && self.in_flight == Some(request)
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            tracing::debug!(from = %self.phase, to = %next, template_type = %self.template_type, "selector transition");
        }
        self.phase = next;
    }
}
