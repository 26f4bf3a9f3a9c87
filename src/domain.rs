//! Core domain types shared across modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a repository tree entry, as reported by the listing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
}

/// One entry of a repository snapshot.
///
/// Serialized with the listing service's field names (`path`, `type`) so the
/// same JSON travels from the tree source through the relay unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl RepoEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::Blob }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::Tree }
    }

    /// Final path segment, used as the node's display label.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Containing directory, or `None` for root-level entries.
    pub fn parent(&self) -> Option<&str> {
        self.path.rsplit_once('/').map(|(parent, _)| parent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Streaming,
    Done,
    Failed,
}

impl MessageStatus {
    pub fn is_final(self) -> bool {
        matches!(self, MessageStatus::Done | MessageStatus::Failed)
    }
}

/// A single chat message. `text` only grows while streaming and is frozen once
/// the status is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub text: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Text as shown to the user, with padded emphasis markers collapsed.
    pub fn display_text(&self) -> String {
        crate::client::markdown::tidy_markdown(&self.text)
    }
}

/// Layout direction of the rendered flowchart.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum GraphDirection {
    /// Top to bottom
    #[default]
    #[value(name = "TD")]
    Td,
    /// Left to right
    #[value(name = "LR")]
    Lr,
    /// Bottom to top
    #[value(name = "BT")]
    Bt,
    /// Right to left
    #[value(name = "RL")]
    Rl,
}

impl GraphDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            GraphDirection::Td => "TD",
            GraphDirection::Lr => "LR",
            GraphDirection::Bt => "BT",
            GraphDirection::Rl => "RL",
        }
    }
}

/// Exact `(parent, child)` edge-label rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeOverride {
    pub parent: String,
    pub child: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 4000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Maximum number of characters of tree JSON embedded in the prompt.
    pub tree_char_limit: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            tree_char_limit: 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base: String,
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self { api_base: "https://api.github.com".to_string(), token: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { server_url: "http://localhost:4000".to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub direction: GraphDirection,
    pub exclude_globs: Vec<String>,
    pub edge_overrides: Vec<EdgeOverride>,
}

/// Complete configuration, assembled from file, environment and CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub github: GithubConfig,
    pub client: ClientConfig,
    pub graph: GraphConfig,
}
