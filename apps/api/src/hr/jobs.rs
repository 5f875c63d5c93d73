//! Job posting construction and the public job board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::registry::SkillProfileRegistry;
use crate::models::job::{JobPosting, JobTypeKey};

/// HR's new-job form. Absent keyword lists are prefilled from the `type_key` template.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewJobRequest {
    pub title: Option<String>,
    pub type_key: JobTypeKey,
    pub description: Option<String>,
    pub required_csv: Option<String>,
    pub optional_csv: Option<String>,
}

/// Jobs split the way the public board shows them.
#[derive(Debug, Clone, Serialize)]
pub struct JobBoard {
    pub pinned: Vec<JobPosting>,
    pub others: Vec<JobPosting>,
}

/// Splits a comma-separated keyword list, trimming and dropping blanks.
pub fn parse_keyword_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn build_job(
    request: NewJobRequest,
    registry: &SkillProfileRegistry,
    now: DateTime<Utc>,
) -> JobPosting {
    let template = registry.template(request.type_key.as_key());

    let required_keywords = match request.required_csv {
        Some(csv) => parse_keyword_csv(&csv),
        None => template
            .map(|t| t.profile.required_keywords.clone())
            .unwrap_or_default(),
    };
    let optional_keywords = match request.optional_csv {
        Some(csv) => parse_keyword_csv(&csv),
        None => template
            .map(|t| t.profile.optional_keywords.clone())
            .unwrap_or_default(),
    };

    let title = request
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| template.map(|t| format!("{} Role", t.label)))
        .unwrap_or_else(|| "Untitled Job".to_string());

    JobPosting {
        id: Uuid::new_v4(),
        title,
        type_key: request.type_key,
        description: request.description.unwrap_or_default(),
        required_keywords,
        optional_keywords,
        created_at: now,
        pinned: false,
    }
}

pub fn job_board(jobs: Vec<JobPosting>) -> JobBoard {
    let (pinned, others): (Vec<_>, Vec<_>) = jobs.into_iter().partition(|j| j.pinned);
    JobBoard { pinned, others }
}
