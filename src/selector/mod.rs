//! Template selector: choose a template and apply it to a target field.
//!
//! The selector is the orchestrator of the apply workflow. It opens a
//! dropdown of templates for one [`TemplateType`](crate::models::TemplateType),
//! loads the list from the shared [`TemplateCache`](crate::cache::TemplateCache)
//! or a fresh fetch, asks for confirmation when applying would overwrite a
//! non-empty value, and writes the resolved content through a
//! [`TemplateTarget`].
//!
//! # Layers
//!
//! - [`machine`] - the state machine (`Closed`, `Loading`, `Loaded`, `Error`,
//!   `Confirming`, `Applying`) with no I/O
//! - [`focus`] - the confirmation dialog's focus trap
//! - [`dropdown`] - pure projection of state into a view model
//! - [`backend`] - collaborator traits and the cache-invalidating store
//! - [`driver`] - async session task running collaborator calls
//!
//! # Guarantees
//!
//! - Opening with a fresh cache entry issues no fetch.
//! - At most one apply is in flight; further confirm or select triggers are
//!   ignored until it resolves.
//! - Dismiss gestures are ignored while applying.
//! - Late results from a superseded request never reach state.
//! - Collaborator failures become state (`Error` phase or `last_error`),
//!   never errors returned to the caller.

pub mod backend;
pub mod driver;
pub mod dropdown;
pub mod focus;
pub mod machine;

pub use backend::{CachedTemplateStore, TemplateSource, TemplateStore, TemplateTarget};
pub use driver::{SelectorEvent, SelectorHandle, SelectorSnapshot};
pub use dropdown::{DropdownItem, DropdownProps, DropdownView, render_dropdown};
pub use focus::{DialogControl, FocusTrap, Key};
pub use machine::{
    Command, DismissReason, Phase, RequestId, SelectionOutcome, SelectorMachine, evaluate_selection,
};
