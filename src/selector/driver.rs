//! Async driver for a selector session.
//!
//! [`SelectorHandle::spawn`] moves a [`SelectorMachine`] into a single tokio
//! task that owns it for the session's lifetime. UI events and collaborator
//! completions arrive on one queue and are processed strictly one at a time,
//! which gives the machine the same ordering guarantees as a single-threaded
//! event loop. Collaborator calls run as separate tasks and report back
//! through the queue; the machine's request-id check drops results that
//! arrive after the session moved on.
//!
//! Every processed message publishes a [`SelectorSnapshot`] on a
//! [`watch`] channel for observers.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::backend::{TemplateSource, TemplateTarget};
use super::dropdown::DropdownView;
use super::focus::{DialogControl, Key};
use super::machine::{Command, DismissReason, Phase, RequestId, SelectorMachine};
use crate::constants::SELECTOR_EVENT_QUEUE;
use crate::core::YtaError;
use crate::models::Template;

/// User interaction forwarded to the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorEvent {
    /// Trigger control activated (also retries after an error)
    Open,
    Select {
        template_id: i64,
    },
    Confirm,
    Cancel,
    Dismiss(DismissReason),
    Key(Key),
}

#[derive(Debug)]
enum Message {
    Ui(SelectorEvent),
    Fetched {
        request: RequestId,
        result: Result<Vec<Template>, String>,
    },
    Applied {
        request: RequestId,
        template_id: i64,
        result: Result<(), String>,
    },
}

/// Observable state after each processed message.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorSnapshot {
    pub phase: Phase,
    pub templates: Vec<Template>,
    pub pending_selection: Option<Template>,
    pub last_error: Option<String>,
    pub focused: Option<DialogControl>,
    pub view: DropdownView,
    /// Id of the most recently applied template in this session
    pub applied: Option<i64>,
}

impl SelectorSnapshot {
    fn capture(machine: &SelectorMachine, applied: Option<i64>) -> Self {
        Self {
            phase: machine.phase(),
            templates: machine.templates().to_vec(),
            pending_selection: machine.pending_selection().cloned(),
            last_error: machine.last_error().map(str::to_string),
            focused: machine.focused(),
            view: machine.view(),
            applied,
        }
    }
}

/// Handle to a running selector session.
#[derive(Debug)]
pub struct SelectorHandle {
    events: mpsc::Sender<Message>,
    state: watch::Receiver<SelectorSnapshot>,
    task: JoinHandle<SelectorMachine>,
}

impl SelectorHandle {
    /// Start the session task.
    pub fn spawn<S, T>(machine: SelectorMachine, source: Arc<S>, target: Arc<T>) -> Self
    where
        S: TemplateSource,
        T: TemplateTarget,
    {
        let (events, inbox) = mpsc::channel(SELECTOR_EVENT_QUEUE);
        let (state_tx, state) = watch::channel(SelectorSnapshot::capture(&machine, None));
        let outbox = events.downgrade();

        let task = tokio::spawn(run(machine, source, target, inbox, outbox, state_tx));

        Self {
            events,
            state,
            task,
        }
    }

    /// Queue a user interaction.
    pub async fn send(&self, event: SelectorEvent) -> Result<(), YtaError> {
        self.events.send(Message::Ui(event)).await.map_err(|_| YtaError::SelectorClosed)
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> SelectorSnapshot {
        self.state.borrow().clone()
    }

    /// Wait until the published state satisfies `predicate`.
    ///
    /// Only published states are observed, so a phase that is entered and
    /// left while handling a single message cannot be waited for.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SelectorSnapshot) -> bool,
    ) -> Result<SelectorSnapshot, YtaError> {
        self.state
            .wait_for(predicate)
            .await
            .map(|snapshot| snapshot.clone())
            .map_err(|_| YtaError::SelectorClosed)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SelectorSnapshot> {
        self.state.clone()
    }

    /// Stop accepting events and return the machine once in-flight
    /// collaborator calls have reported back.
    pub async fn shutdown(self) -> Result<SelectorMachine, YtaError> {
        drop(self.events);
        self.task.await.map_err(|e| YtaError::Other {
            message: format!("selector task failed: {e}"),
        })
    }
}

async fn run<S, T>(
    mut machine: SelectorMachine,
    source: Arc<S>,
    target: Arc<T>,
    mut inbox: mpsc::Receiver<Message>,
    outbox: mpsc::WeakSender<Message>,
    state: watch::Sender<SelectorSnapshot>,
) -> SelectorMachine
where
    S: TemplateSource,
    T: TemplateTarget,
{
    let mut applied = None;

    while let Some(message) = inbox.recv().await {
        let command = match message {
            Message::Ui(event) => handle_event(&mut machine, target.as_ref(), event),
            Message::Fetched {
                request,
                result,
            } => {
                machine.complete_fetch(request, result);
                None
            }
            Message::Applied {
                request,
                template_id,
                result,
            } => {
                let committed = machine.in_flight() == Some(request) && result.is_ok();
                machine.complete_apply(request, result);
                if committed {
                    applied = Some(template_id);
                }
                None
            }
        };

        if let Some(command) = command {
            dispatch(command, &source, &target, &outbox);
        }
        state.send_replace(SelectorSnapshot::capture(&machine, applied));
    }

    tracing::trace!("selector session ended");
    machine
}

fn handle_event<T: TemplateTarget>(
    machine: &mut SelectorMachine,
    target: &T,
    event: SelectorEvent,
) -> Option<Command> {
    tracing::trace!(?event, phase = %machine.phase(), "selector event");
    match event {
        SelectorEvent::Open => machine.open(),
        SelectorEvent::Select {
            template_id,
        } => {
            let current = target.current_value();
            machine.select(template_id, current.as_deref())
        }
        SelectorEvent::Confirm => machine.confirm(),
        SelectorEvent::Cancel => {
            machine.cancel();
            None
        }
        SelectorEvent::Dismiss(reason) => {
            machine.dismiss(reason);
            None
        }
        SelectorEvent::Key(key) => machine.handle_key(key),
    }
}

fn dispatch<S, T>(
    command: Command,
    source: &Arc<S>,
    target: &Arc<T>,
    outbox: &mpsc::WeakSender<Message>,
) where
    S: TemplateSource,
    T: TemplateTarget,
{
    // Holding a strong sender keeps the session alive until the result lands
    let reply = outbox.upgrade();

    match command {
        Command::Fetch {
            request,
            template_type,
        } => {
            let source = Arc::clone(source);
            tokio::spawn(async move {
                let result =
                    source.fetch_templates(template_type).await.map_err(|e| format!("{e:#}"));
                if let Some(reply) = reply {
                    let _ = reply
                        .send(Message::Fetched {
                            request,
                            result,
                        })
                        .await;
                }
            });
        }
        Command::Apply {
            request,
            template_id,
            content,
        } => {
            let target = Arc::clone(target);
            tokio::spawn(async move {
                let result = target.apply(content).await.map_err(|e| format!("{e:#}"));
                if let Some(reply) = reply {
                    let _ = reply
                        .send(Message::Applied {
                            request,
                            template_id,
                            result,
                        })
                        .await;
                }
            });
        }
    }
}
