use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::intake::extract::OcrClient;
use crate::matching::ai_merge::AiScorer;
use crate::matching::registry::SkillProfileRegistry;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Config,
    /// Skill profile table shared by intake scoring and HR job templates.
    pub registry: Arc<SkillProfileRegistry>,
    /// Optional external AI scorer. `None` means keyword-only scoring.
    pub ai_scorer: Option<Arc<dyn AiScorer>>,
    /// Image OCR collaborator; `None` when not configured.
    pub ocr: Option<OcrClient>,
    /// Serialises load → mutate → save cycles on the stored collections.
    pub write_lock: Arc<Mutex<()>>,
}
