//! Repository flow graph: bucket classification, edge labels, Mermaid output

pub mod builder;
pub mod mermaid;
pub mod rules;

pub use builder::{
    sanitize_id, BucketGroup, Edge, EdgeOverrides, GraphBuilder, GraphDescription, Node, ROOT_NODE,
};
pub use mermaid::render_mermaid;
pub use rules::{classify, CATCH_ALL_BUCKET};
