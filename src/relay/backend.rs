//! Text-generation backends driven in streaming mode

use crate::domain::BackendConfig;
use crate::relay::prompt::PromptMessage;
use crate::wire::{EventBuffer, DONE_SENTINEL};
use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fragments in backend emission order.
pub type FragmentStream = BoxStream<'static, Result<String, BackendError>>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("No API key configured for the completion backend")]
    MissingApiKey,

    #[error("Completion backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed completion chunk: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Completion backend reported: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Start a streaming completion. Errors before the first fragment are
    /// returned directly; errors mid-stream arrive as stream items.
    async fn stream_completion(
        &self,
        messages: Vec<PromptMessage>,
    ) -> Result<FragmentStream, BackendError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: &'a [PromptMessage],
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<UpstreamError>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct UpstreamError {
    message: String,
}

/// OpenAI-compatible `/chat/completions` client.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiBackend {
    pub fn new(client: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

/// Content of one upstream event: `Ok(None)` for chunks without text (role
/// announcements, finish reasons).
fn chunk_content(data: &str) -> Result<Option<String>, BackendError> {
    let chunk: CompletionChunk = serde_json::from_str(data)?;
    if let Some(error) = chunk.error {
        return Err(BackendError::Upstream(error.message));
    }
    Ok(chunk.choices.into_iter().next().and_then(|choice| choice.delta.content))
}

fn fragments_from_body(response: reqwest::Response) -> impl Stream<Item = Result<String, BackendError>> {
    try_stream! {
        let mut body = Box::pin(response.bytes_stream());
        let mut events = EventBuffer::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for data in events.push(&chunk) {
                if data == DONE_SENTINEL {
                    return;
                }
                if let Some(text) = chunk_content(&data)? {
                    yield text;
                }
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn stream_completion(
        &self,
        messages: Vec<PromptMessage>,
    ) -> Result<FragmentStream, BackendError> {
        let api_key = self.api_key.as_deref().ok_or(BackendError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);
        let payload = CompletionRequest { model: &self.model, stream: true, messages: &messages };

        tracing::debug!("Requesting streamed completion from {} ({})", url, self.model);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(500).collect();
            return Err(BackendError::Status { status: status.as_u16(), body });
        }

        Ok(fragments_from_body(response).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_content_reads_delta_text() {
        let data = r#"{"id":"x","choices":[{"index":0,"delta":{"content":"Hel"}}]}"#;
        assert_eq!(chunk_content(data).expect("parse"), Some("Hel".to_string()));
    }

    #[test]
    fn chunk_content_skips_role_and_finish_chunks() {
        let role = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        let finish = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        assert_eq!(chunk_content(role).expect("parse"), None);
        assert_eq!(chunk_content(finish).expect("parse"), None);
        assert_eq!(chunk_content(r#"{"choices":[]}"#).expect("parse"), None);
    }

    #[test]
    fn chunk_content_surfaces_upstream_errors() {
        let data = r#"{"error":{"message":"quota exceeded","type":"insufficient_quota"}}"#;
        let err = chunk_content(data).expect_err("error chunk");
        assert!(matches!(err, BackendError::Upstream(ref m) if m == "quota exceeded"));
    }

    #[test]
    fn chunk_content_rejects_garbage() {
        assert!(matches!(chunk_content("not json"), Err(BackendError::Decode(_))));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_network() {
        let backend = OpenAiBackend::new(
            reqwest::Client::new(),
            &BackendConfig { base_url: "http://127.0.0.1:9".to_string(), ..BackendConfig::default() },
        );
        let err = match backend.stream_completion(Vec::new()).await {
            Ok(_) => panic!("expected missing key error"),
            Err(err) => err,
        };
        assert!(matches!(err, BackendError::MissingApiKey));
    }
}
