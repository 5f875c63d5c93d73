use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::fit::FitLevel;
use crate::models::null_as_default;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

/// A candidate application as stored by the intake workflow and mutated by HR.
///
/// Score fields are `None` when the position could not be matched to any skill
/// profile. Every field decodes to its default when missing from storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    #[serde(deserialize_with = "null_as_default")]
    pub id: Uuid,
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub position: String,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cover_letter: String,
    pub resume_file_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub resume_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub submitted_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: ApplicationStatus,
    pub interview_date: Option<DateTime<Utc>>,

    pub score: Option<u32>,
    pub max_score: Option<u32>,
    pub score_percent: Option<u32>,
    pub fit_level: Option<FitLevel>,
    #[serde(deserialize_with = "null_as_default")]
    pub matched_required: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub matched_optional: Vec<String>,
    /// Lower-cased union of keyword and AI matches.
    #[serde(deserialize_with = "null_as_default")]
    pub matched_keywords: Vec<String>,
    pub ai_score: Option<f64>,
    pub ai_rationale: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub potential_job_ids: Vec<Uuid>,
    #[serde(deserialize_with = "null_as_default")]
    pub potential_job_titles: Vec<String>,
}
