pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::hr::handlers as hr;
use crate::intake::handlers as intake;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Intake
        .route(
            "/api/v1/applications",
            post(intake::handle_submit_application).get(hr::handle_list_applications),
        )
        .route(
            "/api/v1/applications/score",
            post(intake::handle_score_preview),
        )
        // HR review
        .route(
            "/api/v1/applications/:id",
            delete(hr::handle_delete_application),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(hr::handle_set_status),
        )
        .route(
            "/api/v1/applications/:id/interview",
            put(hr::handle_schedule_interview).delete(hr::handle_clear_interview),
        )
        .route(
            "/api/v1/applications/:id/highlight",
            get(hr::handle_highlight),
        )
        // Job postings
        .route(
            "/api/v1/jobs",
            get(hr::handle_list_jobs).post(hr::handle_create_job),
        )
        .route("/api/v1/jobs/re-evaluate", post(hr::handle_re_evaluate))
        .route(
            "/api/v1/jobs/:id",
            delete(hr::handle_delete_job),
        )
        .route("/api/v1/jobs/:id/pin", patch(hr::handle_toggle_pin))
        .route("/api/v1/skill-profiles", get(hr::handle_list_skill_profiles))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::matching::registry::SkillProfileRegistry;
    use crate::store::Store;

    // Handlers exercised here never reach the store, so no Redis server is needed.
    fn test_state() -> AppState {
        let config = Config {
            redis_url: "redis://127.0.0.1:6399/".to_string(),
            anthropic_api_key: None,
            ai_scoring_timeout: Duration::from_secs(15),
            ocr_api_url: None,
            ocr_api_key: None,
            skill_profiles_path: None,
            port: 0,
            rust_log: "info".to_string(),
        };
        AppState {
            store: Store::new(redis::Client::open(config.redis_url.as_str()).unwrap()),
            config,
            registry: Arc::new(SkillProfileRegistry::with_defaults()),
            ai_scorer: None,
            ocr: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_router(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "recruit-api");
    }

    #[tokio::test]
    async fn test_skill_profiles_listing() {
        let response = build_router(test_state())
            .oneshot(
                Request::get("/api/v1/skill-profiles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 5);
        assert_eq!(body[0]["key"], "frontend");
    }

    #[tokio::test]
    async fn test_score_preview_rejects_blank_position() {
        let response = build_router(test_state())
            .oneshot(
                Request::post("/api/v1/applications/score")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"resume_text": "SQL", "position": "  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
