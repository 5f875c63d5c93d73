//! Axum route handlers for the HR API.
//!
//! Every mutating handler holds `AppState::write_lock` across its load → mutate → save
//! cycle so the stored collections have a single writer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::hr::applications::{
    clear_interview, filter_applications, find_application_mut, schedule_interview, set_status,
    ApplicationFilter,
};
use crate::hr::jobs::{build_job, job_board, JobBoard, NewJobRequest};
use crate::matching::highlight::highlight;
use crate::matching::potential::{re_evaluate_all, remove_job_tags, tag_potential_fits};
use crate::matching::registry::ProfileTemplate;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::JobPosting;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job: JobPosting,
    pub tagged_applications: usize,
}

#[derive(Debug, Serialize)]
pub struct ReEvaluateResponse {
    pub jobs: usize,
    pub applications: usize,
    pub tagged_applications: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

#[derive(Debug, Deserialize)]
pub struct InterviewRequest {
    pub interview_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HighlightResponse {
    pub application_id: Uuid,
    pub markup: String,
    pub keywords: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<JobBoard>, AppError> {
    let jobs = state.store.load_jobs().await?;
    Ok(Json(job_board(jobs)))
}

/// POST /api/v1/jobs
///
/// Creates a posting (newest first) and tags every stored application that fits it.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<NewJobRequest>,
) -> Result<(StatusCode, Json<CreateJobResponse>), AppError> {
    let job = build_job(request, &state.registry, Utc::now());

    let _guard = state.write_lock.lock().await;
    let mut jobs = state.store.load_jobs().await?;
    let mut applications = state.store.load_applications().await?;

    jobs.insert(0, job.clone());
    let tagged_applications = tag_potential_fits(&job, &mut applications);

    state.store.save_all(&jobs, &applications).await?;

    info!(
        "Created job {} ({:?}); {tagged_applications} potential fit(s)",
        job.id, job.title
    );
    Ok((
        StatusCode::CREATED,
        Json(CreateJobResponse {
            job,
            tagged_applications,
        }),
    ))
}

/// DELETE /api/v1/jobs/:id
///
/// Removes the posting and immediately strips its tags from every application.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let _guard = state.write_lock.lock().await;
    let mut jobs = state.store.load_jobs().await?;

    let idx = jobs
        .iter()
        .position(|j| j.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    let deleted = jobs.remove(idx);

    let mut applications = state.store.load_applications().await?;
    remove_job_tags(&deleted, &jobs, &mut applications);

    state.store.save_all(&jobs, &applications).await?;

    info!("Deleted job {id} ({:?})", deleted.title);
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/jobs/:id/pin
pub async fn handle_toggle_pin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    let _guard = state.write_lock.lock().await;
    let mut jobs = state.store.load_jobs().await?;

    let job = jobs
        .iter_mut()
        .find(|j| j.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    job.pinned = !job.pinned;
    let updated = job.clone();

    state.store.save_jobs(&jobs).await?;
    Ok(Json(updated))
}

/// POST /api/v1/jobs/re-evaluate
///
/// Clears all potential-fit tags and re-tags against every current posting.
pub async fn handle_re_evaluate(
    State(state): State<AppState>,
) -> Result<Json<ReEvaluateResponse>, AppError> {
    let _guard = state.write_lock.lock().await;
    let jobs = state.store.load_jobs().await?;
    let mut applications = state.store.load_applications().await?;

    re_evaluate_all(&jobs, &mut applications);
    let tagged_applications = applications
        .iter()
        .filter(|a| !a.potential_job_ids.is_empty())
        .count();

    state.store.save_applications(&applications).await?;

    info!(
        "Re-evaluated {} application(s) against {} job(s)",
        applications.len(),
        jobs.len()
    );
    Ok(Json(ReEvaluateResponse {
        jobs: jobs.len(),
        applications: applications.len(),
        tagged_applications,
    }))
}

/// GET /api/v1/skill-profiles
pub async fn handle_list_skill_profiles(
    State(state): State<AppState>,
) -> Json<Vec<ProfileTemplate>> {
    Json(state.registry.templates().to_vec())
}

// ────────────────────────────────────────────────────────────────────────────
// Applications
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/applications?position=&status=&sort_by=score|date
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications = state.store.load_applications().await?;
    Ok(Json(filter_applications(applications, &filter)))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let _guard = state.write_lock.lock().await;
    let mut applications = state.store.load_applications().await?;

    let before = applications.len();
    applications.retain(|a| a.id != id);
    if applications.len() == before {
        return Err(AppError::NotFound(format!("Application {id} not found")));
    }

    state.store.save_applications(&applications).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Application>, AppError> {
    mutate_application(&state, id, |app| set_status(app, update.status)).await
}

/// PUT /api/v1/applications/:id/interview
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<InterviewRequest>,
) -> Result<Json<Application>, AppError> {
    mutate_application(&state, id, |app| {
        schedule_interview(app, request.interview_date);
        Ok(())
    })
    .await
}

/// DELETE /api/v1/applications/:id/interview
pub async fn handle_clear_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    mutate_application(&state, id, |app| {
        clear_interview(app);
        Ok(())
    })
    .await
}

/// GET /api/v1/applications/:id/highlight
///
/// Resume text as escaped HTML with the application's matched keywords marked.
pub async fn handle_highlight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HighlightResponse>, AppError> {
    let applications = state.store.load_applications().await?;
    let app = applications
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    Ok(Json(HighlightResponse {
        application_id: app.id,
        markup: highlight(&app.resume_text, &app.matched_keywords),
        keywords: app.matched_keywords.clone(),
    }))
}

async fn mutate_application<F>(
    state: &AppState,
    id: Uuid,
    mutate: F,
) -> Result<Json<Application>, AppError>
where
    F: FnOnce(&mut Application) -> Result<(), AppError>,
{
    let _guard = state.write_lock.lock().await;
    let mut applications = state.store.load_applications().await?;

    let app = find_application_mut(&mut applications, id)?;
    mutate(app)?;
    let updated = app.clone();

    state.store.save_applications(&applications).await?;
    Ok(Json(updated))
}
