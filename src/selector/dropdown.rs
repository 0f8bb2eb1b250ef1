//! Presentation of the template dropdown.
//!
//! [`render_dropdown`] is a pure function from [`DropdownProps`] to a
//! [`DropdownView`]; it holds no state and makes no decisions beyond which
//! display state applies and which templates belong to the active type. The
//! view model is what a front end (or the CLI's text rendering) draws.

use serde::Serialize;
use std::fmt;

use super::focus::DialogControl;
use crate::models::{Template, TemplateType};
use crate::placeholder::extract_placeholders;

/// Inputs to [`render_dropdown`].
#[derive(Debug, Clone, Copy)]
pub struct DropdownProps<'a> {
    pub open: bool,
    pub template_type: TemplateType,
    pub templates: &'a [Template],
    pub loading: bool,
    /// Error that prevented the list from loading
    pub error: Option<&'a str>,
    /// Error from a failed apply, shown above the list
    pub inline_error: Option<&'a str>,
    pub is_applying: bool,
    pub confirmation: Option<ConfirmationProps<'a>>,
}

/// The replace-confirmation dialog's inputs.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationProps<'a> {
    pub template: &'a Template,
    pub current_value: &'a str,
    pub focused: DialogControl,
}

/// One selectable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownItem {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub placeholders: Vec<String>,
    /// Disabled while an apply is in flight
    pub disabled: bool,
}

/// Link to the template creation screen, offered instead of an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateLink {
    pub label: String,
    pub path: String,
}

impl CreateLink {
    fn for_type(template_type: TemplateType) -> Self {
        Self {
            label: format!("Create a {template_type} template"),
            path: format!("/templates/new?type={template_type}"),
        }
    }
}

/// Modal dialog shown before replacing a non-empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationView {
    pub title: String,
    pub message: String,
    pub template_name: String,
    pub current_value: String,
    pub controls: Vec<DialogControl>,
    pub focused: DialogControl,
}

/// What the dropdown shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DropdownView {
    Hidden,
    /// Placeholder rows, no interaction
    Loading,
    /// The list could not be loaded; reopening retries
    Error {
        message: String,
    },
    /// No templates of the active type
    Empty {
        create_link: CreateLink,
    },
    List {
        items: Vec<DropdownItem>,
        inline_error: Option<String>,
        confirmation: Option<ConfirmationView>,
    },
}

impl DropdownView {
    /// The confirmation dialog, if one is showing.
    #[must_use]
    pub fn confirmation(&self) -> Option<&ConfirmationView> {
        match self {
            DropdownView::List {
                confirmation,
                ..
            } => confirmation.as_ref(),
            _ => None,
        }
    }

    /// Rows of the list, empty for every other state.
    #[must_use]
    pub fn items(&self) -> &[DropdownItem] {
        match self {
            DropdownView::List {
                items,
                ..
            } => items,
            _ => &[],
        }
    }
}

/// Project props into a view.
///
/// Precedence: hidden, loading, error, empty, list.
#[must_use]
pub fn render_dropdown(props: &DropdownProps<'_>) -> DropdownView {
    if !props.open {
        return DropdownView::Hidden;
    }
    if props.loading {
        return DropdownView::Loading;
    }
    if let Some(message) = props.error {
        return DropdownView::Error {
            message: message.to_string(),
        };
    }

    let items: Vec<DropdownItem> = props
        .templates
        .iter()
        .filter(|t| t.template_type == props.template_type)
        .map(|t| DropdownItem {
            id: t.id,
            name: t.name.clone(),
            content: t.content.clone(),
            placeholders: extract_placeholders(&t.content).tokens().to_vec(),
            disabled: props.is_applying,
        })
        .collect();

    if items.is_empty() {
        return DropdownView::Empty {
            create_link: CreateLink::for_type(props.template_type),
        };
    }

    DropdownView::List {
        items,
        inline_error: props.inline_error.map(str::to_string),
        confirmation: props.confirmation.map(|c| ConfirmationView {
            title: "Replace current value?".to_string(),
            message: format!(
                "Applying \"{}\" will replace the current {}.",
                c.template.name, props.template_type
            ),
            template_name: c.template.name.clone(),
            current_value: c.current_value.to_string(),
            controls: DialogControl::ORDER.to_vec(),
            focused: c.focused,
        }),
    }
}

impl fmt::Display for DropdownView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropdownView::Hidden => Ok(()),
            DropdownView::Loading => writeln!(f, "Loading templates..."),
            DropdownView::Error {
                message,
            } => writeln!(f, "Failed to load templates: {message}"),
            DropdownView::Empty {
                create_link,
            } => writeln!(f, "No templates yet. {} ({})", create_link.label, create_link.path),
            DropdownView::List {
                items,
                inline_error,
                confirmation,
            } => {
                if let Some(error) = inline_error {
                    writeln!(f, "! {error}")?;
                }
                for item in items {
                    let marker = if item.disabled {
                        "-"
                    } else {
                        "*"
                    };
                    writeln!(f, "{marker} [{}] {}: {}", item.id, item.name, item.content)?;
                }
                if let Some(dialog) = confirmation {
                    writeln!(f, "\n{}\n{}", dialog.title, dialog.message)?;
                    writeln!(f, "Current: {}", dialog.current_value)?;
                    let controls = dialog
                        .controls
                        .iter()
                        .map(|c| {
                            if *c == dialog.focused {
                                format!("[{c}]")
                            } else {
                                c.to_string()
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("  ");
                    writeln!(f, "{controls}")?;
                }
                Ok(())
            }
        }
    }
}
