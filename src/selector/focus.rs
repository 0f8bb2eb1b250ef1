//! Keyboard focus trap for the replace-confirmation dialog.
//!
//! The dialog is rendered as an overlay outside the normal document flow, so
//! natural tab order cannot be relied on. [`FocusTrap`] implements the wrap
//! rule explicitly: Tab on the last control moves to the first, Shift+Tab on
//! the first moves to the last, and focus never leaves the dialog's controls.

use serde::Serialize;
use std::fmt;

/// Controls of the confirmation dialog, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogControl {
    Cancel,
    Replace,
}

impl DialogControl {
    /// Tab order of the confirmation dialog.
    pub const ORDER: [DialogControl; 2] = [DialogControl::Cancel, DialogControl::Replace];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            DialogControl::Cancel => "Cancel",
            DialogControl::Replace => "Replace",
        }
    }
}

impl fmt::Display for DialogControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keys the selector reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    ShiftTab,
    /// Enter or Space: activate the focused control
    Enter,
    Escape,
}

/// Closed focus loop over a fixed, non-empty list of controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap<C> {
    controls: Vec<C>,
    index: usize,
}

impl<C: Copy + PartialEq> FocusTrap<C> {
    /// Trap focus over `controls`, starting on `initial`.
    ///
    /// Returns `None` if `controls` is empty or does not contain `initial`.
    #[must_use]
    pub fn new(controls: Vec<C>, initial: C) -> Option<Self> {
        let index = controls.iter().position(|c| *c == initial)?;
        Some(Self {
            controls,
            index,
        })
    }

    #[must_use]
    pub fn focused(&self) -> C {
        self.controls[self.index]
    }

    /// Tab: move forward, wrapping from the last control to the first.
    pub fn next(&mut self) -> C {
        self.index = (self.index + 1) % self.controls.len();
        self.focused()
    }

    /// Shift+Tab: move backward, wrapping from the first control to the last.
    pub fn prev(&mut self) -> C {
        self.index = if self.index == 0 {
            self.controls.len() - 1
        } else {
            self.index - 1
        };
        self.focused()
    }

    /// Focus `control` directly (e.g. on pointer hover). Ignored, returning
    /// `false`, if the control is not part of the trap.
    pub fn focus(&mut self, control: C) -> bool {
        match self.controls.iter().position(|c| *c == control) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn controls(&self) -> &[C] {
        &self.controls
    }
}

impl FocusTrap<DialogControl> {
    /// Trap for the replace-confirmation dialog, focused on "Replace".
    #[must_use]
    pub fn confirmation() -> Self {
        Self {
            controls: DialogControl::ORDER.to_vec(),
            index: 1,
        }
    }
}
