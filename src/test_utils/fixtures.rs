//! Sample records for tests

use chrono::{NaiveDate, NaiveDateTime};

use crate::constants::DEFAULT_WORKSPACE_ID;
use crate::models::{Project, Template, TemplateType};

/// Fixed timestamp so fixtures compare equal across runs.
pub fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap_or_default()
}

pub fn template(id: i64, template_type: TemplateType, name: &str, content: &str) -> Template {
    Template {
        id,
        template_type,
        name: name.to_string(),
        content: content.to_string(),
        workspace_id: DEFAULT_WORKSPACE_ID,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// Two title templates and one description template.
pub fn sample_templates() -> Vec<Template> {
    vec![
        template(1, TemplateType::Title, "How-To", "How to {{action}} in {{year}}"),
        template(2, TemplateType::Title, "Top N", "Top {{n}} {{topic}} tips"),
        template(
            3,
            TemplateType::Description,
            "Intro",
            "In this video we cover {{topic}}. Subscribe for more!",
        ),
    ]
}

pub fn project(id: i64, video_title: Option<&str>) -> Project {
    Project {
        id,
        title: format!("Project {id}"),
        description: None,
        status: Some("draft".to_string()),
        video_title: video_title.map(str::to_string),
    }
}

/// JSON body the API returns for a template.
pub fn template_json(template: &Template) -> serde_json::Value {
    serde_json::json!({
        "id": template.id,
        "type": template.template_type.as_str(),
        "name": template.name,
        "content": template.content,
        "workspace_id": template.workspace_id,
        "created_at": template.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "updated_at": template.updated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}
