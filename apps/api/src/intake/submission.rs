//! Submission pipeline: validate the form → resolve resume text → score → build the record.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::extract::{extract_resume_text, OcrClient, ResumeUpload};
use crate::matching::ai_merge::{fetch_ai_score, merge_ai_score, AiScorer, MergedScore};
use crate::matching::fit::classify;
use crate::matching::registry::SkillProfileRegistry;
use crate::matching::scorer::{score_position, PositionScore};
use crate::models::application::Application;
use crate::models::job::JobPosting;

/// Text fields of the application form plus the optional resume file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub experience: String,
    pub cover_letter: String,
    /// Manually entered resume text; wins over anything extracted from the file.
    pub resume_text: Option<String>,
    #[serde(skip)]
    pub resume: Option<ResumeUpload>,
}

impl ApplicationForm {
    /// Assigns a named multipart text field. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "full_name" => self.full_name = value,
            "email" => self.email = value,
            "phone" => self.phone = value,
            "position" => self.position = value,
            "experience" => self.experience = value,
            "cover_letter" => self.cover_letter = value,
            "resume_text" => self.resume_text = Some(value),
            _ => {}
        }
    }

    /// Full name, email and position are mandatory.
    pub fn validate(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("position", &self.position),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Scoring collaborators borrowed from `AppState` for one submission.
pub struct ScoringContext<'a> {
    pub registry: &'a SkillProfileRegistry,
    pub jobs: &'a [JobPosting],
    pub ai_scorer: Option<&'a dyn AiScorer>,
    pub ai_timeout: Duration,
}

/// Keyword score for a position, lifted by the AI scorer when it does better.
/// `None` when no skill profile matches the position.
pub async fn score_resume(
    resume_text: &str,
    position: &str,
    ctx: &ScoringContext<'_>,
) -> Option<MergedScore> {
    let keyword = match score_position(resume_text, position, ctx.registry, ctx.jobs) {
        PositionScore::Scored(result) => result,
        PositionScore::Unscored => {
            info!("No skill profile for position {position:?}; application left unscored");
            return None;
        }
    };

    let ai = fetch_ai_score(ctx.ai_scorer, resume_text, position, ctx.ai_timeout).await;
    Some(merge_ai_score(keyword, ai))
}

/// Writes a merged score onto an application record.
pub fn apply_score(app: &mut Application, merged: MergedScore) {
    let result = merged.result;
    app.score = Some(result.raw_score);
    app.max_score = Some(result.max_score);
    app.score_percent = Some(result.percent);
    app.fit_level = Some(classify(result.percent));
    app.matched_required = result.matched_required;
    app.matched_optional = result.matched_optional;
    app.matched_keywords = merged.matched_keywords;
    app.ai_score = merged.ai_score;
    app.ai_rationale = merged.ai_rationale;
}

/// Runs the full intake pipeline and returns the record to persist.
pub async fn build_application(
    form: ApplicationForm,
    ocr: Option<&OcrClient>,
    ctx: &ScoringContext<'_>,
) -> Result<Application, AppError> {
    form.validate()?;

    let manual_text = form
        .resume_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let resume_text = match (manual_text, &form.resume) {
        (Some(text), _) => text,
        (None, Some(upload)) => extract_resume_text(upload, ocr).await.unwrap_or_default(),
        (None, None) => String::new(),
    };

    let mut app = Application {
        id: Uuid::new_v4(),
        full_name: form.full_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        position: form.position.trim().to_string(),
        experience: form.experience,
        cover_letter: form.cover_letter,
        resume_file_name: form.resume.as_ref().map(|r| r.file_name.clone()),
        resume_text,
        submitted_at: Utc::now(),
        ..Default::default()
    };

    if let Some(merged) = score_resume(&app.resume_text, &app.position, ctx).await {
        info!(
            "Application {} scored {}% ({:?})",
            app.id, merged.result.percent, merged.source
        );
        apply_score(&mut app, merged);
    }

    Ok(app)
}
