//! Deterministic local answers used when the relay is unreachable

use crate::domain::RepoEntry;
use once_cell::sync::Lazy;
use regex::Regex;

static STRUCTURE_QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)structure|file").expect("valid regex"));

const SAMPLE_SIZE: usize = 3;

/// Substitute answer for `question`. Depends only on its inputs.
pub fn local_answer(question: &str, repo_name: &str, entries: &[RepoEntry]) -> String {
    if STRUCTURE_QUESTION.is_match(question) {
        let sample: Vec<String> =
            entries.iter().take(SAMPLE_SIZE).map(|e| format!("• {}", e.path)).collect();
        return format!("**Files in {repo_name}**\n\n{}", sample.join("\n"));
    }
    format!("I'm not sure – could you ask something more specific about **{repo_name}**?")
}
