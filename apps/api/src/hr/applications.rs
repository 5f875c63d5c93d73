//! HR review of stored applications: filtering, sorting, status and interviews.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Score,
    Date,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationFilter {
    /// Case-insensitive substring of the declared position.
    pub position: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub sort_by: SortBy,
}

/// Filters, then sorts by score (highest first, unscored as 0) or by newest submission.
pub fn filter_applications(
    mut applications: Vec<Application>,
    filter: &ApplicationFilter,
) -> Vec<Application> {
    if let Some(term) = filter
        .position
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let term = term.to_lowercase();
        applications.retain(|a| a.position.to_lowercase().contains(&term));
    }
    if let Some(status) = filter.status {
        applications.retain(|a| a.status == status);
    }

    match filter.sort_by {
        SortBy::Score => applications
            .sort_by(|a, b| b.score_percent.unwrap_or(0).cmp(&a.score_percent.unwrap_or(0))),
        SortBy::Date => applications.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at)),
    }
    applications
}

pub fn find_application_mut(
    applications: &mut [Application],
    id: Uuid,
) -> Result<&mut Application, AppError> {
    applications
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

/// HR may move an application to reviewed, accepted or rejected.
/// Leaving (or never reaching) accepted clears any scheduled interview.
pub fn set_status(app: &mut Application, status: ApplicationStatus) -> Result<(), AppError> {
    if status == ApplicationStatus::Pending {
        return Err(AppError::Validation(
            "status must be one of reviewed, accepted, rejected".to_string(),
        ));
    }
    app.status = status;
    if status != ApplicationStatus::Accepted {
        app.interview_date = None;
    }
    Ok(())
}

pub fn schedule_interview(app: &mut Application, when: DateTime<Utc>) {
    app.interview_date = Some(when);
}

pub fn clear_interview(app: &mut Application) {
    app.interview_date = None;
}
