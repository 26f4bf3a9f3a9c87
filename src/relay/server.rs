//! HTTP endpoint for the answer relay

use crate::relay::{relay_answer, AnalyzeRequest, CompletionBackend};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures_util::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

const MAX_REQUEST_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct RelayState {
    pub backend: Arc<dyn CompletionBackend>,
    pub tree_char_limit: usize,
}

impl RelayState {
    pub fn new(backend: Arc<dyn CompletionBackend>, tree_char_limit: usize) -> Self {
        Self { backend, tree_char_limit }
    }
}

/// Each record becomes its own body chunk, so hyper writes it out as soon as
/// the backend produces it. The response ends when the record stream ends.
async fn handle_analyze(
    State(state): State<RelayState>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let records = relay_answer(state.backend.clone(), request, state.tree_char_limit)
        .map(|record| Ok::<_, Infallible>(record.encode()));

    (
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache, no-transform"),
            (CONNECTION, "keep-alive"),
        ],
        Body::from_stream(records),
    )
        .into_response()
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/api/analyze", post(handle_analyze))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: RelayState) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    tracing::info!("Answer relay listening on {}", addr);
    axum::serve(listener, router(state)).await.context("Relay server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RepoEntry;
    use crate::relay::testing::{Script, ScriptedBackend};

    async fn spawn(script: Script) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let state = RelayState::new(Arc::new(ScriptedBackend(script)), 8000);
        tokio::spawn(async move {
            let _ = serve(listener, state).await;
        });
        format!("http://{addr}/api/analyze")
    }

    fn body() -> AnalyzeRequest {
        AnalyzeRequest {
            repo: "https://github.com/acme/site".to_string(),
            tree: vec![RepoEntry::blob("README.md")],
            question: None,
        }
    }

    #[tokio::test]
    async fn streams_records_with_event_stream_headers() {
        let url = spawn(Script::Fragments(vec!["Hello", " there"])).await;
        let response = reqwest::Client::new().post(&url).json(&body()).send().await.expect("send");

        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE.as_str()], "text/event-stream");
        assert_eq!(headers[CACHE_CONTROL.as_str()], "no-cache, no-transform");

        let text = response.text().await.expect("body");
        assert_eq!(text, "data: Hello\n\ndata:  there\n\ndata: [DONE]\n\n");
    }

    #[tokio::test]
    async fn backend_failure_is_reported_in_stream() {
        let url = spawn(Script::Refuse("no quota")).await;
        let response = reqwest::Client::new().post(&url).json(&body()).send().await.expect("send");
        assert!(response.status().is_success());
        let text = response.text().await.expect("body");
        assert_eq!(text, "data: [ERROR] Completion backend reported: no quota\n\n");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let url = spawn(Script::Fragments(Vec::new())).await;
        let response = reqwest::Client::new()
            .post(&url)
            .header(CONTENT_TYPE.as_str(), "application/json")
            .body("{not json")
            .send()
            .await
            .expect("send");
        assert!(response.status().is_client_error());
    }
}
