//! AI-score merge policy: an optional external scorer can lift, never lower, a result.
//!
//! The AI score (0–100) is normalized onto the keyword result's `max_score`. When the
//! normalized value beats the keyword `raw_score`, the AI score and its percent win.
//! Matched keywords are always the union of both sources.
//!
//! `AppState` holds an `Option<Arc<dyn AiScorer>>`; `None` means keyword-only scoring.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::matching::prompts::{AI_SCORE_PROMPT_TEMPLATE, AI_SCORE_SYSTEM};
use crate::matching::scorer::ScoreResult;

/// Payload returned by an external AI scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiScore {
    pub score: f64, // 0 – 100
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Keyword,
    Ai,
}

/// Final score after the merge policy has been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedScore {
    pub result: ScoreResult,
    /// Lower-cased union of keyword matches and AI-reported keywords.
    pub matched_keywords: Vec<String>,
    pub ai_score: Option<f64>,
    pub ai_rationale: Option<String>,
    pub source: ScoreSource,
}

/// External AI scorer seam. Implement this to swap providers without touching intake.
#[async_trait]
pub trait AiScorer: Send + Sync {
    async fn score(&self, resume_text: &str, position: &str) -> Result<AiScore, LlmError>;
}

/// AI scorer backed by the shared LLM client.
pub struct LlmAiScorer(pub LlmClient);

#[async_trait]
impl AiScorer for LlmAiScorer {
    async fn score(&self, resume_text: &str, position: &str) -> Result<AiScore, LlmError> {
        let prompt = AI_SCORE_PROMPT_TEMPLATE
            .replace("{position}", position)
            .replace("{resume_text}", resume_text);
        let system = format!("{AI_SCORE_SYSTEM} {JSON_ONLY_SYSTEM}");
        self.0.call_json::<AiScore>(&prompt, &system).await
    }
}

/// Asks the AI scorer under a hard timeout. Any failure is logged and yields `None`.
pub async fn fetch_ai_score(
    scorer: Option<&dyn AiScorer>,
    resume_text: &str,
    position: &str,
    timeout: Duration,
) -> Option<AiScore> {
    let scorer = scorer?;

    let ai = match tokio::time::timeout(timeout, scorer.score(resume_text, position)).await {
        Ok(Ok(ai)) => ai,
        Ok(Err(e)) => {
            warn!("AI scorer unavailable, keeping keyword score: {e}");
            return None;
        }
        Err(_) => {
            warn!(
                "AI scorer timed out after {}s, keeping keyword score",
                timeout.as_secs()
            );
            return None;
        }
    };

    if !ai.score.is_finite() {
        warn!("AI scorer returned a non-numeric score, keeping keyword score");
        return None;
    }

    debug!("AI scorer returned {:.1}", ai.score);
    Some(AiScore {
        score: ai.score.clamp(0.0, 100.0),
        ..ai
    })
}

/// Applies the merge policy to a keyword result and an optional AI score.
pub fn merge_ai_score(keyword: ScoreResult, ai: Option<AiScore>) -> MergedScore {
    let mut matched_keywords = keyword.matched_keywords();

    let Some(ai) = ai.filter(|a| a.score.is_finite()) else {
        return MergedScore {
            result: keyword,
            matched_keywords,
            ai_score: None,
            ai_rationale: None,
            source: ScoreSource::Keyword,
        };
    };

    for kw in &ai.matched_keywords {
        let lower = kw.trim().to_lowercase();
        if !lower.is_empty() && !matched_keywords.contains(&lower) {
            matched_keywords.push(lower);
        }
    }

    let ai_value = ai.score.clamp(0.0, 100.0);
    let normalized = (ai_value / 100.0 * keyword.max_score as f64).round() as u32;

    let (result, source) = if normalized > keyword.raw_score {
        let percent = (ai_value.round() as u32).min(100);
        let result = ScoreResult {
            raw_score: normalized,
            percent,
            ..keyword
        };
        (result, ScoreSource::Ai)
    } else {
        (keyword, ScoreSource::Keyword)
    };

    MergedScore {
        result,
        matched_keywords,
        ai_score: Some(ai_value),
        ai_rationale: ai.rationale,
        source,
    }
}
