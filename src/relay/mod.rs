//! Answer relay: drives a completion backend and forwards its fragments as
//! self-delimited records.

use crate::domain::RepoEntry;
use crate::wire::Record;
use async_stream::stream;
use futures_util::{FutureExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub mod backend;
pub mod prompt;
pub mod server;

pub use backend::{BackendError, CompletionBackend, FragmentStream, OpenAiBackend};
pub use prompt::{build_messages, PromptMessage};
pub use server::{router, serve, RelayState};

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub repo: String,
    #[serde(default)]
    pub tree: Vec<RepoEntry>,
    #[serde(default)]
    pub question: Option<String>,
}

/// Relay one question.
///
/// Yields one [`Record::Fragment`] per non-empty backend fragment, in backend
/// order, then exactly one terminal record: [`Record::Done`] on success or
/// [`Record::Error`] on any failure, including a panic while polling the
/// backend. Nothing is yielded after the terminal record.
pub fn relay_answer(
    backend: Arc<dyn CompletionBackend>,
    request: AnalyzeRequest,
    tree_char_limit: usize,
) -> impl Stream<Item = Record> + Send + 'static {
    stream! {
        tracing::info!(
            "Relaying question for {} ({} tree entries)",
            request.repo,
            request.tree.len()
        );
        let messages = build_messages(&request, tree_char_limit);

        let mut fragments = match backend.stream_completion(messages).await {
            Ok(fragments) => fragments,
            Err(e) => {
                tracing::warn!("Completion request for {} failed: {}", request.repo, e);
                yield Record::Error(e.to_string());
                return;
            }
        };

        let mut relayed = 0usize;
        loop {
            match AssertUnwindSafe(fragments.next()).catch_unwind().await {
                Ok(Some(Ok(text))) => {
                    if text.is_empty() {
                        continue;
                    }
                    relayed += 1;
                    yield Record::Fragment(text);
                }
                Ok(Some(Err(e))) => {
                    tracing::warn!("Completion stream for {} broke after {} fragments: {}", request.repo, relayed, e);
                    yield Record::Error(e.to_string());
                    break;
                }
                Ok(None) => {
                    tracing::debug!("Relayed {} fragments for {}", relayed, request.repo);
                    yield Record::Done;
                    break;
                }
                Err(_) => {
                    tracing::error!("Completion stream for {} panicked", request.repo);
                    yield Record::Error("internal relay failure".to_string());
                    break;
                }
            }
        }
    }
}
