// Resume/job matching engine.
// Scoring, fit classification, AI merge, potential-fit tagging, highlighting.
// Everything here is pure except `ai_merge::fetch_ai_score`.

pub mod ai_merge;
pub mod fit;
pub mod highlight;
pub mod potential;
pub mod prompts;
pub mod registry;
pub mod scorer;
