//! Chat prompt assembly for repository questions

use crate::relay::AnalyzeRequest;
use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "You are FlowGen-AI, a concise repo analyst.";
pub const DEFAULT_QUESTION: &str = "Give an overview.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self { role: role.to_string(), content: content.into() }
    }
}

/// First `limit` characters of `text`, never splitting a character.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the four-message conversation sent to the backend: instructions,
/// repository context (tree JSON capped at `tree_char_limit` characters), a
/// priming acknowledgement, and the question itself.
pub fn build_messages(request: &AnalyzeRequest, tree_char_limit: usize) -> Vec<PromptMessage> {
    let tree_json = serde_json::to_string(&request.tree).unwrap_or_else(|_| "[]".to_string());
    let context = format!(
        "Repository URL: {}\nFile tree (JSON):\n{}",
        request.repo,
        truncate_chars(&tree_json, tree_char_limit)
    );
    let question = request
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_QUESTION);

    vec![
        PromptMessage::new("system", SYSTEM_PROMPT),
        PromptMessage::new("user", context),
        PromptMessage::new("assistant", "Ready."),
        PromptMessage::new("user", question),
    ]
}
