//! Skill profile registry: the single table of job-track vocabularies.
//!
//! Built once at startup (`SkillProfileRegistry::with_defaults`, optionally extended from a
//! JSON file) and carried in `AppState` as `Arc<SkillProfileRegistry>`. Both the intake
//! scorer and the HR job templates read from this one table.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::job::JobPosting;

/// Required and optional keyword phrases for one job track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillProfile {
    #[serde(default)]
    pub required_keywords: Vec<String>,
    #[serde(default)]
    pub optional_keywords: Vec<String>,
}

impl SkillProfile {
    pub fn new(required: &[&str], optional: &[&str]) -> Self {
        Self {
            required_keywords: required.iter().map(|s| s.to_string()).collect(),
            optional_keywords: optional.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.required_keywords.is_empty() && self.optional_keywords.is_empty()
    }
}

/// A named base track (e.g. `frontend`) and its profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileTemplate {
    pub key: String,
    pub label: String,
    pub profile: SkillProfile,
}

/// Maps a position label to one or more base tracks.
///
/// A rule matches when the normalized label contains any of `terms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRule {
    pub terms: Vec<String>,
    pub tracks: Vec<String>,
}

/// On-disk overrides loaded from `SKILL_PROFILES_PATH`.
#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    templates: Vec<ProfileTemplate>,
    #[serde(default)]
    rules: Vec<PositionRule>,
}

#[derive(Debug, Clone)]
pub struct SkillProfileRegistry {
    templates: Vec<ProfileTemplate>,
    rules: Vec<PositionRule>,
}

impl SkillProfileRegistry {
    pub fn new(templates: Vec<ProfileTemplate>, rules: Vec<PositionRule>) -> Self {
        Self { templates, rules }
    }

    /// Built-in tracks used by the job templates and intake scoring.
    pub fn with_defaults() -> Self {
        let templates = vec![
            template(
                "frontend",
                "Frontend",
                &["HTML", "CSS", "JavaScript", "Angular", "React"],
                &["TypeScript", "Tailwind", "Next.js", "Vue"],
            ),
            template(
                "backend",
                "Backend",
                &["Node.js", "Express", "Django", "SQL", "API"],
                &["MongoDB", "PostgreSQL", "Redis", "Microservices", "Docker"],
            ),
            template(
                "project_manager",
                "Project Manager",
                &["Agile", "Scrum", "Leadership", "Project Planning", "Budgeting"],
                &["Jira", "Risk Management", "Stakeholder Communication"],
            ),
            template(
                "data_analyst",
                "Data Analyst",
                &["SQL", "Excel", "Python", "Data Visualization", "Statistics"],
                &["Power BI", "Tableau", "Machine Learning", "Pandas"],
            ),
            template(
                "uiux",
                "UI/UX",
                &["Wireframing", "Prototyping", "User Research", "Figma", "Adobe XD"],
                &["Sketch", "InVision", "Usability Testing", "Design Thinking"],
            ),
        ];

        // First matching rule wins, so "full" must precede "front"/"back".
        let rules = vec![
            rule(&["full"], &["frontend", "backend"]),
            rule(&["front"], &["frontend"]),
            rule(&["back"], &["backend"]),
            rule(&["project", "manager", "scrum"], &["project_manager"]),
            rule(&["data", "analyst"], &["data_analyst"]),
            rule(&["ui/ux", "ux", "design"], &["uiux"]),
        ];

        Self::new(templates, rules)
    }

    /// Defaults extended by a JSON file. Templates with an existing key replace it;
    /// file rules are consulted before the built-in ones.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill profiles from {}", path.display()))?;
        let file: RegistryFile = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid skill profile file {}", path.display()))?;

        let mut registry = Self::with_defaults();
        let template_count = file.templates.len();
        for tpl in file.templates {
            match registry.templates.iter_mut().find(|t| t.key == tpl.key) {
                Some(existing) => *existing = tpl,
                None => registry.templates.push(tpl),
            }
        }
        let mut rules = file.rules;
        rules.append(&mut registry.rules);
        registry.rules = rules;

        info!(
            "Loaded {template_count} skill profile template(s) from {}",
            path.display()
        );
        Ok(registry)
    }

    pub fn templates(&self) -> &[ProfileTemplate] {
        &self.templates
    }

    pub fn template(&self, key: &str) -> Option<&ProfileTemplate> {
        self.templates.iter().find(|t| t.key == key)
    }

    /// Base profiles for a free-text position label, via the ordered rule table.
    /// Empty when no rule matches.
    pub fn profiles_for_label(&self, label: &str) -> Vec<&SkillProfile> {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        self.rules
            .iter()
            .find(|r| r.terms.iter().any(|t| normalized.contains(&t.to_lowercase())))
            .map(|r| {
                r.tracks
                    .iter()
                    .filter_map(|key| self.template(key).map(|t| &t.profile))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Profiles for a position, preferring an HR posting whose title equals the label.
    pub fn resolve_position(&self, label: &str, jobs: &[JobPosting]) -> Vec<SkillProfile> {
        let wanted = label.trim();
        if let Some(job) = jobs
            .iter()
            .find(|j| !wanted.is_empty() && j.title.trim().eq_ignore_ascii_case(wanted))
        {
            return vec![job.skill_profile()];
        }

        self.profiles_for_label(label).into_iter().cloned().collect()
    }
}

impl Default for SkillProfileRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn template(key: &str, label: &str, required: &[&str], optional: &[&str]) -> ProfileTemplate {
    ProfileTemplate {
        key: key.to_string(),
        label: label.to_string(),
        profile: SkillProfile::new(required, optional),
    }
}

fn rule(terms: &[&str], tracks: &[&str]) -> PositionRule {
    PositionRule {
        terms: terms.iter().map(|s| s.to_string()).collect(),
        tracks: tracks.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobTypeKey;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_defaults_cover_all_template_keys() {
        let registry = SkillProfileRegistry::with_defaults();
        for key in [
            JobTypeKey::Frontend,
            JobTypeKey::Backend,
            JobTypeKey::ProjectManager,
            JobTypeKey::DataAnalyst,
            JobTypeKey::Uiux,
        ] {
            assert!(
                registry.template(key.as_key()).is_some(),
                "missing template {}",
                key.as_key()
            );
        }
    }

    #[test]
    fn test_front_label_maps_to_frontend() {
        let registry = SkillProfileRegistry::with_defaults();
        let profiles = registry.profiles_for_label("Senior Frontend Developer");
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].required_keywords.contains(&"React".to_string()));
    }

    #[test]
    fn test_full_stack_maps_to_frontend_and_backend() {
        let registry = SkillProfileRegistry::with_defaults();
        let profiles = registry.profiles_for_label("Full Stack Engineer");
        assert_eq!(profiles.len(), 2);
        assert!(profiles[0].required_keywords.contains(&"HTML".to_string()));
        assert!(profiles[1].required_keywords.contains(&"Node.js".to_string()));
    }

    #[test]
    fn test_unknown_label_has_no_profiles() {
        let registry = SkillProfileRegistry::with_defaults();
        assert!(registry.profiles_for_label("Chef").is_empty());
        assert!(registry.profiles_for_label("   ").is_empty());
    }

    #[test]
    fn test_posting_title_takes_precedence_over_rules() {
        let registry = SkillProfileRegistry::with_defaults();
        let job = JobPosting {
            title: "Frontend Wizard".to_string(),
            required_keywords: vec!["Svelte".to_string()],
            ..Default::default()
        };
        let profiles = registry.resolve_position("frontend wizard", &[job]);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].required_keywords, vec!["Svelte".to_string()]);
    }

    #[test]
    fn test_resolve_falls_back_to_rules() {
        let registry = SkillProfileRegistry::with_defaults();
        let profiles = registry.resolve_position("Data Analyst", &[]);
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].required_keywords.contains(&"Excel".to_string()));
    }

    #[test]
    fn test_file_rules_take_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(
            &path,
            r#"{
                "templates": [
                    {"key": "devops", "label": "DevOps",
                     "profile": {"required_keywords": ["Kubernetes", "Terraform"]}}
                ],
                "rules": [{"terms": ["devops", "platform"], "tracks": ["devops"]}]
            }"#,
        )
        .unwrap();

        let registry = SkillProfileRegistry::from_file(&path).unwrap();
        let profiles = registry.profiles_for_label("Backend Platform Engineer");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].required_keywords[0], "Kubernetes");
        assert!(registry.template("frontend").is_some());
        assert!(registry.template(JobTypeKey::Custom.as_key()).is_none());
    }

    #[test]
    fn test_file_template_replaces_builtin_key() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"templates": [{{"key": "frontend", "label": "Frontend",
                 "profile": {{"required_keywords": ["Svelte"]}}}}]}}"#
        )
        .unwrap();

        let registry = SkillProfileRegistry::from_file(file.path()).unwrap();
        assert_eq!(registry.templates().len(), 5);
        let profiles = registry.profiles_for_label("Frontend Developer");
        assert_eq!(profiles[0].required_keywords, vec!["Svelte".to_string()]);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(SkillProfileRegistry::from_file(file.path()).is_err());
    }
}
