use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::registry::SkillProfile;
use crate::models::null_as_default;

/// Which template a posting was created from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobTypeKey {
    #[default]
    Frontend,
    Backend,
    ProjectManager,
    DataAnalyst,
    Uiux,
    Custom,
}

impl JobTypeKey {
    pub fn as_key(&self) -> &'static str {
        match self {
            JobTypeKey::Frontend => "frontend",
            JobTypeKey::Backend => "backend",
            JobTypeKey::ProjectManager => "project_manager",
            JobTypeKey::DataAnalyst => "data_analyst",
            JobTypeKey::Uiux => "uiux",
            JobTypeKey::Custom => "custom",
        }
    }
}

/// An HR-authored job posting. Missing fields decode to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPosting {
    #[serde(deserialize_with = "null_as_default")]
    pub id: Uuid,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub type_key: JobTypeKey,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub required_keywords: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub optional_keywords: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub pinned: bool,
}

impl JobPosting {
    pub fn skill_profile(&self) -> SkillProfile {
        SkillProfile {
            required_keywords: self.required_keywords.clone(),
            optional_keywords: self.optional_keywords.clone(),
        }
    }
}
