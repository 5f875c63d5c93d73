//! Potential-Fit Tagger: flags existing applications that plausibly suit a job posting.
//!
//! This is token-set membership, deliberately looser than the scorer's substring test:
//! an application's keyword set is built from its stored matches, a crude tokenization of
//! the resume text, and the words of its declared position. A job is a potential fit when
//! at least `max(2, ceil(|required| / 2))` of its required keywords are in that set.

use std::collections::HashSet;

use tracing::debug;

use crate::models::application::Application;
use crate::models::job::JobPosting;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotentialFit {
    pub potential: bool,
    pub required_hits: usize,
    pub optional_hits: usize,
}

/// Minimum required-keyword hits for a posting with `required_len` required keywords.
pub fn potential_fit_threshold(required_len: usize) -> usize {
    2.max(required_len.max(1).div_ceil(2))
}

/// Lower-cased keyword set derived from everything known about an application.
pub fn application_keywords(app: &Application) -> HashSet<String> {
    let mut set = HashSet::new();

    for kw in app
        .matched_required
        .iter()
        .chain(&app.matched_optional)
        .chain(&app.matched_keywords)
    {
        if !kw.is_empty() {
            set.insert(kw.to_lowercase());
        }
    }

    set.extend(tokenize_resume(&app.resume_text));

    set.extend(
        app.position
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string),
    );

    set
}

/// Splits on runs of characters outside `[a-z0-9+#.]` and keeps tokens of length ≥ 2.
pub fn tokenize_resume(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !is_token_char(c.to_ascii_lowercase()))
        .filter(|tok| tok.len() >= 2)
        .map(|tok| tok.to_ascii_lowercase())
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '#' | '.')
}

pub fn is_potential_fit(job: &JobPosting, app: &Application) -> PotentialFit {
    let keywords = application_keywords(app);
    let hits = |list: &[String]| {
        list.iter()
            .filter(|kw| keywords.contains(&kw.to_lowercase()))
            .count()
    };

    let required_hits = hits(&job.required_keywords);
    let optional_hits = hits(&job.optional_keywords);

    PotentialFit {
        potential: required_hits >= potential_fit_threshold(job.required_keywords.len()),
        required_hits,
        optional_hits,
    }
}

/// Tags every application that is a potential fit for `job`. Idempotent.
///
/// Returns the number of applications that qualified.
pub fn tag_potential_fits(job: &JobPosting, applications: &mut [Application]) -> usize {
    let mut tagged = 0;
    for app in applications.iter_mut() {
        let fit = is_potential_fit(job, app);
        if !fit.potential {
            continue;
        }
        tagged += 1;
        if !app.potential_job_ids.contains(&job.id) {
            app.potential_job_ids.push(job.id);
        }
        if !app.potential_job_titles.contains(&job.title) {
            app.potential_job_titles.push(job.title.clone());
        }
        debug!(
            "Application {} tagged for job {} ({} required hits)",
            app.id, job.id, fit.required_hits
        );
    }
    tagged
}

/// Clears every application's tags, then re-tags for each job in list order.
pub fn re_evaluate_all(jobs: &[JobPosting], applications: &mut [Application]) {
    for app in applications.iter_mut() {
        app.potential_job_ids.clear();
        app.potential_job_titles.clear();
    }
    for job in jobs {
        tag_potential_fits(job, applications);
    }
}

/// Cascades a job deletion into every application's tag lists.
///
/// The title is dropped with the id unless another job still tagged on the same
/// application carries the same title.
pub fn remove_job_tags(
    deleted: &JobPosting,
    remaining: &[JobPosting],
    applications: &mut [Application],
) {
    for app in applications.iter_mut() {
        let before = app.potential_job_ids.len();
        app.potential_job_ids.retain(|id| *id != deleted.id);
        if app.potential_job_ids.len() == before {
            continue;
        }

        let title_still_used = remaining.iter().any(|job| {
            job.title == deleted.title && app.potential_job_ids.contains(&job.id)
        });
        if !title_still_used {
            app.potential_job_titles.retain(|t| *t != deleted.title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn job(title: &str, required: &[&str], optional: &[&str]) -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            title: title.to_string(),
            required_keywords: required.iter().map(|s| s.to_string()).collect(),
            optional_keywords: optional.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn app(resume: &str, position: &str) -> Application {
        Application {
            id: Uuid::new_v4(),
            resume_text: resume.to_string(),
            position: position.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_threshold() {
        assert_eq!(potential_fit_threshold(0), 2);
        assert_eq!(potential_fit_threshold(1), 2);
        assert_eq!(potential_fit_threshold(4), 2);
        assert_eq!(potential_fit_threshold(5), 3);
        assert_eq!(potential_fit_threshold(8), 4);
    }

    #[test]
    fn test_tokenize_keeps_plus_hash_dot() {
        let tokens: Vec<String> = tokenize_resume("C++, C#; Node.js / a SQL!").collect();
        assert_eq!(tokens, vec!["c++", "c#", "node.js", "sql"]);
    }

    #[test]
    fn test_keywords_include_matches_and_position_words() {
        let mut a = app("", "Senior Data Analyst");
        a.matched_required = vec!["Project Planning".to_string()];
        a.matched_keywords = vec!["tableau".to_string()];
        let kws = application_keywords(&a);
        assert!(kws.contains("project planning"));
        assert!(kws.contains("tableau"));
        assert!(kws.contains("senior"));
        assert!(kws.contains("analyst"));
    }

    #[test]
    fn test_token_membership_not_substring() {
        let j = job("Backend", &["SQL", "Express", "API", "Django", "Node.js"], &[]);
        // "mysql" and "expressive" must not count as hits
        let a = app("mysql expressive apis", "");
        let fit = is_potential_fit(&j, &a);
        assert_eq!(fit.required_hits, 0);
        assert!(!fit.potential);
    }

    #[test]
    fn test_potential_fit_counts_hits() {
        let j = job(
            "Backend",
            &["SQL", "Express", "API", "Django", "Node.js"],
            &["Docker", "Redis"],
        );
        let a = app("Built an API with Node.js and SQL, shipped on docker", "");
        let fit = is_potential_fit(&j, &a);
        assert_eq!(fit.required_hits, 3);
        assert_eq!(fit.optional_hits, 1);
        assert!(fit.potential);
    }

    #[test]
    fn test_single_required_keyword_still_needs_two_hits() {
        let j = job("Rustacean", &["Rust"], &[]);
        let a = app("rust", "");
        assert!(!is_potential_fit(&j, &a).potential);
    }

    #[test]
    fn test_tagging_is_idempotent() {
        let j = job("Analyst", &["SQL", "Excel", "Python"], &[]);
        let mut apps = vec![app("sql excel python", ""), app("baking", "Chef")];

        assert_eq!(tag_potential_fits(&j, &mut apps), 1);
        let snapshot = apps.clone();
        tag_potential_fits(&j, &mut apps);

        assert_eq!(apps, snapshot);
        assert_eq!(apps[0].potential_job_ids, vec![j.id]);
        assert_eq!(apps[0].potential_job_titles, vec!["Analyst".to_string()]);
        assert!(apps[1].potential_job_ids.is_empty());
    }

    #[test]
    fn test_re_evaluate_clears_stale_tags() {
        let keep = job("Analyst", &["SQL", "Excel"], &[]);
        let mut a = app("sql excel", "");
        a.potential_job_ids = vec![Uuid::new_v4()];
        a.potential_job_titles = vec!["Gone".to_string()];
        let mut apps = vec![a];

        re_evaluate_all(std::slice::from_ref(&keep), &mut apps);

        assert_eq!(apps[0].potential_job_ids, vec![keep.id]);
        assert_eq!(apps[0].potential_job_titles, vec!["Analyst".to_string()]);
    }

    #[test]
    fn test_re_evaluate_follows_job_order() {
        let first = job("First", &["SQL", "Excel"], &[]);
        let second = job("Second", &["SQL", "Excel"], &[]);
        let mut apps = vec![app("sql excel", "")];

        re_evaluate_all(&[second.clone(), first.clone()], &mut apps);

        assert_eq!(apps[0].potential_job_ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_remove_job_tags_cascades_without_touching_others() {
        let analyst = job("Analyst", &["SQL", "Excel"], &[]);
        let backend = job("Backend", &["SQL", "API"], &[]);
        let mut apps = vec![app("sql excel api", ""), app("sql api", "")];
        re_evaluate_all(&[analyst.clone(), backend.clone()], &mut apps);
        assert_eq!(apps[0].potential_job_ids.len(), 2);

        remove_job_tags(&analyst, std::slice::from_ref(&backend), &mut apps);

        for a in &apps {
            assert!(!a.potential_job_ids.contains(&analyst.id));
            assert!(!a.potential_job_titles.contains(&"Analyst".to_string()));
            assert!(a.potential_job_ids.contains(&backend.id));
            assert!(a.potential_job_titles.contains(&"Backend".to_string()));
        }
    }

    #[test]
    fn test_remove_keeps_title_shared_with_remaining_job() {
        let a1 = job("Analyst", &["SQL", "Excel"], &[]);
        let a2 = job("Analyst", &["SQL", "Python"], &[]);
        let mut apps = vec![app("sql excel python", "")];
        re_evaluate_all(&[a1.clone(), a2.clone()], &mut apps);
        assert_eq!(apps[0].potential_job_titles, vec!["Analyst".to_string()]);

        remove_job_tags(&a1, std::slice::from_ref(&a2), &mut apps);

        assert_eq!(apps[0].potential_job_ids, vec![a2.id]);
        assert_eq!(apps[0].potential_job_titles, vec!["Analyst".to_string()]);
    }
}
