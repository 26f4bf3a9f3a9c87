//! HTTP transport to the answer relay

use crate::client::decoder::FragmentDecoder;
use crate::relay::AnalyzeRequest;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use thiserror::Error;

pub type RelayByteStream = BoxStream<'static, reqwest::Result<Bytes>>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Relay returned status {0}")]
    Status(u16),

    #[error("Relay request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct AnalyzeClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AnalyzeClient {
    pub fn new(client: reqwest::Client, server_url: &str) -> Self {
        let endpoint = format!("{}/api/analyze", server_url.trim_end_matches('/'));
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post the question and return a decoder over the streamed response.
    pub async fn stream_answer(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<FragmentDecoder<RelayByteStream>, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(FragmentDecoder::new(response.bytes_stream().boxed()))
    }
}
