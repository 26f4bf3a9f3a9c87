//! repo-flow: map a repository's file listing to a grouped flow graph and chat
//! about it through a streaming answer relay.
//!
//! - [`graph`] classifies entries into buckets, labels edges and renders Mermaid
//! - [`relay`] forwards completion fragments as `data:` records
//! - [`client`] decodes those records into a chat history, with a local fallback

pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod graph;
pub mod relay;
pub mod wire;
