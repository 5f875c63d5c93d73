//! Axum route handlers for the intake API.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::intake::extract::ResumeUpload;
use crate::intake::submission::{build_application, ApplicationForm, ScoringContext};
use crate::matching::fit::{classify, FitLevel};
use crate::matching::scorer::{score_position, PositionScore};
use crate::models::application::Application;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScorePreviewRequest {
    pub resume_text: String,
    pub position: String,
}

#[derive(Debug, Serialize)]
pub struct ScorePreviewResponse {
    pub score: PositionScore,
    pub fit_level: Option<FitLevel>,
    pub fit_label: Option<&'static str>,
}

/// POST /api/v1/applications
///
/// Multipart form: text fields plus an optional `resume` file part.
/// The application is scored once here and stored.
pub async fn handle_submit_application(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let mut form = ApplicationForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "resume" {
            let file_name = field.file_name().unwrap_or("resume").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?;
            if !data.is_empty() {
                form.resume = Some(ResumeUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
        } else {
            let value = field.text().await?;
            form.set_field(&name, value);
        }
    }
    form.validate()?;

    // AI scoring runs outside the write lock.
    let jobs = state.store.load_jobs().await?;
    let ctx = ScoringContext {
        registry: &state.registry,
        jobs: &jobs,
        ai_scorer: state.ai_scorer.as_deref(),
        ai_timeout: state.config.ai_scoring_timeout,
    };
    let app = build_application(form, state.ocr.as_ref(), &ctx).await?;

    let _guard = state.write_lock.lock().await;
    let mut applications = state.store.load_applications().await?;
    applications.push(app.clone());
    state.store.save_applications(&applications).await?;

    info!("Stored application {} for {:?}", app.id, app.position);
    Ok((StatusCode::CREATED, Json(app)))
}

/// POST /api/v1/applications/score
///
/// Keyword-only score preview for a resume and position. Nothing is stored.
pub async fn handle_score_preview(
    State(state): State<AppState>,
    Json(request): Json<ScorePreviewRequest>,
) -> Result<Json<ScorePreviewResponse>, AppError> {
    if request.position.trim().is_empty() {
        return Err(AppError::Validation("position cannot be empty".to_string()));
    }

    let jobs = state.store.load_jobs().await?;
    let score = score_position(&request.resume_text, &request.position, &state.registry, &jobs);
    let fit_level = score.as_result().map(|r| classify(r.percent));

    Ok(Json(ScorePreviewResponse {
        score,
        fit_level,
        fit_label: fit_level.map(|l| l.label()),
    }))
}
