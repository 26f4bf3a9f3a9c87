//! Fragment decoding from the relay byte stream

use crate::wire::{EventBuffer, Record};
use futures_util::{Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// An explicit `[ERROR]` record from the relay.
    #[error("{0}")]
    Backend(String),

    /// The byte stream itself failed (reset, timeout, decode error).
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The byte stream closed before the completion sentinel arrived.
    #[error("Stream ended before completion")]
    UnexpectedEof,
}

impl StreamError {
    pub fn is_transport(&self) -> bool {
        !matches!(self, StreamError::Backend(_))
    }
}

/// Lazy, finite, non-restartable sequence of fragments decoded from one relay
/// response. Create one decoder per request.
///
/// The only suspension point is the read of the next byte chunk; complete
/// records already buffered are handed out without awaiting.
pub struct FragmentDecoder<S> {
    inner: S,
    events: EventBuffer,
    ready: VecDeque<String>,
    finished: bool,
}

impl<S, B, E> FragmentDecoder<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    pub fn new(inner: S) -> Self {
        Self { inner, events: EventBuffer::new(), ready: VecDeque::new(), finished: false }
    }

    /// Next fragment; `None` after the sentinel or after an error has been
    /// reported once.
    pub async fn next_fragment(&mut self) -> Option<Result<String, StreamError>> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(data) = self.ready.pop_front() {
                match Record::from_data(data) {
                    Record::Fragment(text) => return Some(Ok(text)),
                    Record::Done => {
                        self.finished = true;
                        return None;
                    }
                    Record::Error(message) => {
                        self.finished = true;
                        return Some(Err(StreamError::Backend(message)));
                    }
                }
            }

            match self.inner.next().await {
                Some(Ok(chunk)) => self.ready.extend(self.events.push(chunk.as_ref())),
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(StreamError::Transport(e.to_string())));
                }
                None => {
                    self.finished = true;
                    if self.events.has_partial() {
                        tracing::debug!("Discarding incomplete record at end of stream");
                    }
                    return Some(Err(StreamError::UnexpectedEof));
                }
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<String, StreamError>> {
        futures_util::stream::unfold(self, |mut decoder| async move {
            decoder.next_fragment().await.map(|item| (item, decoder))
        })
    }
}
