// Prompts for the optional AI resume scorer.

/// Combined with `llm_client::prompts::JSON_ONLY_SYSTEM` at call time.
pub const AI_SCORE_SYSTEM: &str = "You screen resumes for a recruitment team. \
    Judge fit strictly from what the resume states.";

pub const AI_SCORE_PROMPT_TEMPLATE: &str = r#"Rate how well this resume fits the position below.

Position: {position}

Resume:
"""
{resume_text}
"""

Respond with exactly this JSON shape:
{
  "score": <integer 0-100, overall fit>,
  "matched_keywords": [<skills or tools from the resume relevant to the position>],
  "rationale": "<one or two sentences>"
}

Score only on evidence present in the resume. Do not infer skills that are not stated."#;
