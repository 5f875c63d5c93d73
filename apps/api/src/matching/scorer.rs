//! Resume Scorer: weighted keyword containment against one or more skill profiles.
//!
//! Algorithm:
//! 1. Lower-case the resume text once.
//! 2. Every required keyword contained in the text scores 10, every optional one 5.
//! 3. max_score = 10 × |required| + 5 × |optional| (never below 1).
//! 4. percent = round(raw / max × 100).
//!
//! Containment is plain substring search: "java" matches inside "javascript".
//! The highlighter applies word boundaries on top of this; the scorer does not.

use serde::{Deserialize, Serialize};

use crate::matching::registry::{SkillProfile, SkillProfileRegistry};
use crate::models::job::JobPosting;

pub const REQUIRED_WEIGHT: u32 = 10;
pub const OPTIONAL_WEIGHT: u32 = 5;

/// Outcome of scoring a resume against a skill profile (or a sum of profiles).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub raw_score: u32,
    pub max_score: u32, // ≥ 1
    pub percent: u32,   // 0 – 100
    pub matched_required: Vec<String>,
    pub matched_optional: Vec<String>,
}

impl ScoreResult {
    /// The degenerate result used where a number is needed for an unscored resume.
    #[allow(dead_code)]
    pub fn zero() -> Self {
        Self {
            raw_score: 0,
            max_score: 1,
            percent: 0,
            matched_required: vec![],
            matched_optional: vec![],
        }
    }

    /// Sums raw and max scores, recomputes percent from the totals, unions matches.
    pub fn combine(mut self, other: ScoreResult) -> ScoreResult {
        let raw_score = self.raw_score + other.raw_score;
        let max_score = self.max_score + other.max_score;
        union_into(&mut self.matched_required, other.matched_required);
        union_into(&mut self.matched_optional, other.matched_optional);

        ScoreResult {
            raw_score,
            max_score,
            percent: percent_of(raw_score, max_score),
            matched_required: self.matched_required,
            matched_optional: self.matched_optional,
        }
    }

    /// Lower-cased union of matched required and optional keywords.
    pub fn matched_keywords(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for kw in self.matched_required.iter().chain(&self.matched_optional) {
            let lower = kw.to_lowercase();
            if !out.contains(&lower) {
                out.push(lower);
            }
        }
        out
    }
}

/// Scoring a position label either yields a result or finds no profile at all.
///
/// `Unscored` is kept distinct from a legitimate zero so callers never mistake
/// "we had nothing to score against" for "the resume matched nothing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "result", rename_all = "snake_case")]
pub enum PositionScore {
    Scored(ScoreResult),
    Unscored,
}

impl PositionScore {
    pub fn as_result(&self) -> Option<&ScoreResult> {
        match self {
            PositionScore::Scored(r) => Some(r),
            PositionScore::Unscored => None,
        }
    }

    /// Collapses `Unscored` into the degenerate `{0, 1, 0}` result.
    #[allow(dead_code)]
    pub fn into_result_or_zero(self) -> ScoreResult {
        match self {
            PositionScore::Scored(r) => r,
            PositionScore::Unscored => ScoreResult::zero(),
        }
    }
}

/// `percent = round(raw / max × 100)`, with max floored at 1.
pub fn percent_of(raw: u32, max: u32) -> u32 {
    let max = max.max(1);
    ((raw as f64 / max as f64) * 100.0).round() as u32
}

/// Substring containment of a keyword in already lower-cased text.
pub fn keyword_in_text(normalized_text: &str, keyword: &str) -> bool {
    normalized_text.contains(&keyword.to_lowercase())
}

/// Scores resume text against a single profile. Never fails.
pub fn score(text: &str, profile: &SkillProfile) -> ScoreResult {
    let normalized = text.to_lowercase();

    let mut raw_score = 0;
    let mut matched_required = Vec::new();
    let mut matched_optional = Vec::new();

    for kw in &profile.required_keywords {
        if keyword_in_text(&normalized, kw) {
            raw_score += REQUIRED_WEIGHT;
            if !matched_required.contains(kw) {
                matched_required.push(kw.clone());
            }
        }
    }

    for kw in &profile.optional_keywords {
        if keyword_in_text(&normalized, kw) {
            raw_score += OPTIONAL_WEIGHT;
            if !matched_optional.contains(kw) {
                matched_optional.push(kw.clone());
            }
        }
    }

    let max_score = (REQUIRED_WEIGHT * profile.required_keywords.len() as u32
        + OPTIONAL_WEIGHT * profile.optional_keywords.len() as u32)
        .max(1);

    ScoreResult {
        raw_score,
        max_score,
        percent: percent_of(raw_score, max_score),
        matched_required,
        matched_optional,
    }
}

/// Composite of two base profiles (a hybrid role spanning two tracks).
pub fn score_composite(text: &str, a: &SkillProfile, b: &SkillProfile) -> ScoreResult {
    score(text, a).combine(score(text, b))
}

/// Sum of the component scores of every profile. `None` for an empty slice.
///
/// Each component keeps its own floored max, so the composite max is always the
/// sum of the component maxes.
pub fn score_profiles(text: &str, profiles: &[&SkillProfile]) -> Option<ScoreResult> {
    profiles
        .iter()
        .map(|p| score(text, p))
        .reduce(ScoreResult::combine)
}

/// Scores resume text for a free-text position label.
pub fn score_position(
    text: &str,
    position: &str,
    registry: &SkillProfileRegistry,
    jobs: &[JobPosting],
) -> PositionScore {
    let profiles = registry.resolve_position(position, jobs);
    let refs: Vec<&SkillProfile> = profiles.iter().collect();
    let result = match refs.as_slice() {
        [] => None,
        [a, b] => Some(score_composite(text, a, b)),
        many => score_profiles(text, many),
    };
    match result {
        Some(result) => PositionScore::Scored(result),
        None => PositionScore::Unscored,
    }
}

fn union_into(target: &mut Vec<String>, extra: Vec<String>) {
    for kw in extra {
        if !target.iter().any(|t| t.eq_ignore_ascii_case(&kw)) {
            target.push(kw);
        }
    }
}
