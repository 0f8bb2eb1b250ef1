//! Template management commands: `list`, `create`, `update`, `delete`.
//!
//! Writes go through [`CachedTemplateStore`] and are validated locally before
//! any request is sent, including the duplicate-content check the server
//! would otherwise answer with a 409.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use super::{CliConfig, OutputFormat};
use crate::cache::TemplateCache;
use crate::core::YtaError;
use crate::models::{Template, TemplateDraft, TemplatePatch, TemplateType, find_duplicate_content};
use crate::selector::{
    CachedTemplateStore, Command, Phase, SelectorMachine, TemplateSource, TemplateStore,
};

/// Show templates the way the selector's dropdown lists them.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Only list templates of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub template_type: Option<TemplateType>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ListCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let client = config.api_client().await?;
        let cache = Arc::new(TemplateCache::new());
        let types = match self.template_type {
            Some(template_type) => vec![template_type],
            None => TemplateType::ALL.to_vec(),
        };

        let mut listed: Vec<Template> = Vec::new();
        for template_type in types {
            let machine = load_dropdown(&client, &cache, template_type).await?;
            match self.format {
                OutputFormat::Json => listed.extend_from_slice(machine.templates()),
                OutputFormat::Text => {
                    println!("{}", format!("{template_type} templates").bold());
                    print!("{}", machine.view());
                    println!();
                }
            }
        }

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
        Ok(())
    }
}

/// Open a selector for `template_type` and run its fetch, if any, to
/// completion.
async fn load_dropdown<S: TemplateSource>(
    source: &S,
    cache: &Arc<TemplateCache>,
    template_type: TemplateType,
) -> Result<SelectorMachine> {
    let mut machine = SelectorMachine::new(template_type, Arc::clone(cache));
    if let Some(Command::Fetch {
        request,
        template_type,
    }) = machine.open()
    {
        let result = source.fetch_templates(template_type).await.map_err(|e| format!("{e:#}"));
        machine.complete_fetch(request, result);
    }

    if machine.phase() == Phase::Error {
        return Err(YtaError::FetchFailed {
            message: machine.last_error().unwrap_or("unknown error").to_string(),
        }
        .into());
    }
    Ok(machine)
}

fn duplicate_error(existing: &Template) -> YtaError {
    YtaError::DuplicateTemplate {
        message: format!(
            "'{}' (id {}) already uses this {} content",
            existing.name, existing.id, existing.template_type
        ),
    }
}

#[derive(Args, Debug)]
pub struct CreateCommand {
    #[arg(long = "type", value_name = "TYPE")]
    pub template_type: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub content: String,
}

impl CreateCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let draft = TemplateDraft::new(self.template_type, self.name, self.content).normalize();
        let report = draft.validate();
        if !report.valid {
            return Err(YtaError::InvalidTemplate {
                report,
            }
            .into());
        }
        let template_type = draft.parsed_type()?;

        let client = config.api_client().await?;
        let existing = client.list_templates(Some(template_type)).await?;
        if let Some(duplicate) =
            find_duplicate_content(&existing, template_type, &draft.content, None)
        {
            return Err(duplicate_error(duplicate).into());
        }

        let store = CachedTemplateStore::new(client, Arc::new(TemplateCache::new()));
        let created = store.create_template(draft).await?;
        println!(
            "{} Created {} template '{}' (id {})",
            "✓".green(),
            created.template_type,
            created.name,
            created.id
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateCommand {
    /// Template id
    pub id: i64,

    #[arg(long = "type", value_name = "TYPE")]
    pub template_type: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub content: Option<String>,
}

impl UpdateCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let patch = TemplatePatch {
            template_type: self.template_type,
            name: self.name,
            content: self.content,
        }
        .normalize();
        if patch.is_empty() {
            return Err(YtaError::Other {
                message: "Nothing to update: pass --type, --name or --content".to_string(),
            }
            .into());
        }
        let report = patch.validate();
        if !report.valid {
            return Err(YtaError::InvalidTemplate {
                report,
            }
            .into());
        }

        let client = config.api_client().await?;
        let current = client.get_template(self.id).await?;
        let template_type = match &patch.template_type {
            Some(value) => value.parse()?,
            None => current.template_type,
        };
        let content = patch.content.as_deref().unwrap_or(&current.content);
        let existing = client.list_templates(Some(template_type)).await?;
        if let Some(duplicate) =
            find_duplicate_content(&existing, template_type, content, Some(self.id))
        {
            return Err(duplicate_error(duplicate).into());
        }

        let store = CachedTemplateStore::new(client, Arc::new(TemplateCache::new()));
        let updated = store.update_template(self.id, patch).await?;
        println!("{} Updated template '{}' (id {})", "✓".green(), updated.name, updated.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteCommand {
    /// Template id
    pub id: i64,
}

impl DeleteCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let client = config.api_client().await?;
        let store = CachedTemplateStore::new(client, Arc::new(TemplateCache::new()));
        store.delete_template(self.id).await?;
        println!("{} Deleted template {}", "✓".green(), self.id);
        Ok(())
    }
}
