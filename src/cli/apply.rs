//! `apply`: write a template into a project field.
//!
//! Runs a real selector session against the API: open the dropdown, select
//! the template, and either apply directly (empty field) or go through the
//! replace confirmation, which only `--force` accepts non-interactively.

use anyhow::Result;
use clap::{ArgGroup, Args};
use colored::Colorize;
use std::collections::HashMap;
use std::sync::Arc;
use strsim::levenshtein;

use super::CliConfig;
use crate::cache::TemplateCache;
use crate::client::{ProjectField, ProjectFieldTarget};
use crate::core::YtaError;
use crate::models::{Template, TemplateType};
use crate::selector::{
    Phase, SelectorEvent, SelectorHandle, SelectorMachine, SelectorSnapshot, TemplateTarget,
};

/// Names within this share of the requested name's length (in edits) are
/// offered as suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("selection").required(true).args(["template", "name"])))]
pub struct ApplyCommand {
    /// Project to write to
    #[arg(long)]
    pub project: i64,

    /// Template id
    #[arg(long)]
    pub template: Option<i64>,

    /// Template name (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,

    /// Template type; selects the project field that is written
    #[arg(long = "type", value_name = "TYPE", default_value = "title")]
    pub template_type: TemplateType,

    /// Replace a non-empty field without asking
    #[arg(long)]
    pub force: bool,

    /// Placeholder value, e.g. `--set topic=Rust` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub values: Vec<(String, String)>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("placeholder name is empty in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

impl ApplyCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let client = config.api_client().await?;
        let field = ProjectField::for_type(self.template_type);
        let target = Arc::new(ProjectFieldTarget::load(client.clone(), self.project, field).await?);

        let values: HashMap<String, String> = self.values.iter().cloned().collect();
        let machine = SelectorMachine::new(self.template_type, Arc::new(TemplateCache::new()))
            .with_values(values);
        let mut handle = SelectorHandle::spawn(machine, Arc::new(client), Arc::clone(&target));

        let outcome = self.run(&mut handle).await;
        handle.shutdown().await?;
        let template = outcome?;

        println!(
            "{} Applied '{}' to {} of project {}",
            "✓".green(),
            template.name,
            field.as_str(),
            self.project
        );
        if let Some(value) = target.current_value() {
            println!("  {value}");
        }
        Ok(())
    }

    async fn run(&self, handle: &mut SelectorHandle) -> Result<Template> {
        handle.send(SelectorEvent::Open).await?;
        let loaded =
            handle.wait_for(|s| matches!(s.phase, Phase::Loaded | Phase::Error)).await?;
        if loaded.phase == Phase::Error {
            return Err(YtaError::FetchFailed {
                message: loaded.last_error.unwrap_or_default(),
            }
            .into());
        }

        let template = self.resolve(&loaded.templates)?;
        let id = template.id;
        handle
            .send(SelectorEvent::Select {
                template_id: id,
            })
            .await?;

        let state = handle.wait_for(|s| settled(s, id) || s.phase == Phase::Confirming).await?;
        let state = if state.phase == Phase::Confirming {
            if !self.force {
                handle.send(SelectorEvent::Cancel).await?;
                let current = state
                    .view
                    .confirmation()
                    .map(|dialog| dialog.current_value.clone())
                    .unwrap_or_default();
                return Err(YtaError::ConfirmationRequired {
                    current,
                }
                .into());
            }
            handle.send(SelectorEvent::Confirm).await?;
            handle.wait_for(|s| settled(s, id)).await?
        } else {
            state
        };

        if let Some(message) = state.last_error {
            return Err(YtaError::ApplyFailed {
                message,
            }
            .into());
        }
        Ok(template)
    }

    /// Find the requested template among the loaded templates of the
    /// requested type.
    fn resolve(&self, templates: &[Template]) -> Result<Template, YtaError> {
        let candidates = || templates.iter().filter(|t| t.template_type == self.template_type);

        if let Some(id) = self.template {
            return candidates().find(|t| t.id == id).cloned().ok_or(YtaError::TemplateNotFound {
                id,
            });
        }

        let name = self.name.as_deref().unwrap_or_default();
        candidates().find(|t| t.name.eq_ignore_ascii_case(name.trim())).cloned().ok_or_else(|| {
            YtaError::TemplateNameNotFound {
                name: name.to_string(),
                suggestions: similar_names(name, candidates()),
            }
        })
    }
}

/// Apply finished, successfully or not.
fn settled(snapshot: &SelectorSnapshot, template_id: i64) -> bool {
    snapshot.applied == Some(template_id)
        || (snapshot.phase == Phase::Loaded && snapshot.last_error.is_some())
}

/// Closest template names to `target`, best first, at most three.
fn similar_names<'a>(target: &str, templates: impl IntoIterator<Item = &'a Template>) -> Vec<String> {
    let target = target.trim().to_lowercase();
    let mut scored: Vec<_> = templates
        .into_iter()
        .map(|t| (t.name.clone(), levenshtein(&target, &t.name.to_lowercase())))
        .collect();

    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.chars().count().max(1) * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(name, _)| name)
        .collect()
}
