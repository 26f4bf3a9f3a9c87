//! Graph construction from a flat repository listing.

use crate::domain::{EdgeOverride, EntryKind, GraphConfig, GraphDirection, RepoEntry};
use crate::graph::rules::{bucket_order, classify, heuristic_label};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::collections::HashMap;

/// Identifier of the synthetic parent of every root-level entry.
pub const ROOT_NODE: &str = "root";

/// Replace every non-alphanumeric character with `_`.
///
/// Not injective: `a-b.js` and `a_b_js` map to the same identifier. Colliding
/// nodes merge in the rendered graph.
pub fn sanitize_id(path: &str) -> String {
    path.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub path: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketGroup {
    pub name: &'static str,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: String,
}

/// Deterministic graph description: non-empty buckets in declared order,
/// edges in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphDescription {
    pub repo: String,
    pub direction: GraphDirection,
    pub buckets: Vec<BucketGroup>,
    pub edges: Vec<Edge>,
}

impl GraphDescription {
    pub fn node_count(&self) -> usize {
        self.buckets.iter().map(|b| b.nodes.len()).sum()
    }
}

/// Exact-match edge labels keyed on `(parent path, child path)`.
///
/// Root-level entries have an empty parent path.
#[derive(Debug, Clone, Default)]
pub struct EdgeOverrides {
    rules: HashMap<(String, String), String>,
}

impl EdgeOverrides {
    pub fn insert(&mut self, parent: &str, child: &str, label: &str) {
        self.rules.insert((parent.to_string(), child.to_string()), label.to_string());
    }

    pub fn get(&self, parent: &str, child: &str) -> Option<&str> {
        self.rules.get(&(parent.to_string(), child.to_string())).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> FromIterator<&'a EdgeOverride> for EdgeOverrides {
    fn from_iter<I: IntoIterator<Item = &'a EdgeOverride>>(iter: I) -> Self {
        let mut overrides = EdgeOverrides::default();
        for rule in iter {
            overrides.insert(&rule.parent, &rule.child, &rule.label);
        }
        overrides
    }
}

pub struct GraphBuilder {
    direction: GraphDirection,
    overrides: EdgeOverrides,
    exclude: Option<GlobSet>,
}

impl GraphBuilder {
    pub fn new(direction: GraphDirection) -> Self {
        Self { direction, overrides: EdgeOverrides::default(), exclude: None }
    }

    pub fn from_config(config: &GraphConfig) -> Result<Self> {
        let mut builder = Self::new(config.direction);
        builder.overrides = config.edge_overrides.iter().collect();
        builder.exclude = build_globset(&config.exclude_globs)?;
        if !builder.overrides.is_empty() {
            tracing::debug!("Loaded {} edge label overrides", builder.overrides.len());
        }
        Ok(builder)
    }

    pub fn direction(mut self, direction: GraphDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_override(mut self, parent: &str, child: &str, label: &str) -> Self {
        self.overrides.insert(parent, child, label);
        self
    }

    pub fn label_for(&self, entry: &RepoEntry) -> String {
        let parent = entry.parent().unwrap_or("");
        match self.overrides.get(parent, &entry.path) {
            Some(label) => label.to_string(),
            None => heuristic_label(entry).to_string(),
        }
    }

    fn is_excluded(&self, entry: &RepoEntry) -> bool {
        self.exclude.as_ref().is_some_and(|set| set.is_match(&entry.path))
    }

    pub fn build(&self, repo: &str, entries: &[RepoEntry]) -> GraphDescription {
        let mut grouped: HashMap<&'static str, Vec<Node>> = HashMap::new();
        let mut edges = Vec::with_capacity(entries.len());
        let mut excluded = 0usize;

        for entry in entries {
            if self.is_excluded(entry) {
                excluded += 1;
                continue;
            }

            let id = sanitize_id(&entry.path);
            grouped.entry(classify(entry)).or_default().push(Node {
                id: id.clone(),
                label: entry.name().to_string(),
                path: entry.path.clone(),
                kind: entry.kind,
            });

            let from = entry.parent().map(sanitize_id).unwrap_or_else(|| ROOT_NODE.to_string());
            edges.push(Edge { from, to: id, label: self.label_for(entry) });
        }

        let buckets: Vec<BucketGroup> = bucket_order()
            .filter_map(|name| grouped.remove(name).map(|nodes| BucketGroup { name, nodes }))
            .collect();

        tracing::debug!(
            "Built graph for {}: {} buckets, {} edges, {} entries excluded",
            repo,
            buckets.len(),
            edges.len(),
            excluded
        );

        GraphDescription { repo: repo.to_string(), direction: self.direction, buckets, edges }
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            Glob::new(pattern).with_context(|| format!("Invalid exclude glob: {pattern}"))?,
        );
    }
    Ok(Some(builder.build()?))
}
