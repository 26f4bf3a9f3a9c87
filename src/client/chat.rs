//! Chat session: one question at a time through the relay, with a local
//! fallback when the relay cannot be reached.

use crate::client::decoder::StreamError;
use crate::client::fallback::local_answer;
use crate::client::store::{ChatError, MessageStore, Turn};
use crate::client::transport::AnalyzeClient;
use crate::domain::ChatMessage;
use crate::fetch::RepoContext;
use crate::relay::AnalyzeRequest;
use futures_util::{pin_mut, Stream, StreamExt};

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Sentinel received; the reply holds the streamed text.
    Completed,
    /// The relay sent an explicit error; the reply holds it verbatim.
    BackendError(String),
    /// Transport failed; the reply holds the local fallback answer.
    FellBack(String),
}

/// Apply one fragment stream to `turn`'s reply and finalize it.
///
/// Fragments are applied one by one as they arrive. `on_fragment` sees each
/// fragment after it has been stored.
pub async fn drive_turn<S, F>(
    store: &mut MessageStore,
    turn: &mut Turn,
    fragments: S,
    fallback: impl FnOnce() -> String,
    mut on_fragment: F,
) -> Result<TurnOutcome, ChatError>
where
    S: Stream<Item = Result<String, StreamError>>,
    F: FnMut(&str),
{
    pin_mut!(fragments);
    let failure = loop {
        match fragments.next().await {
            Some(Ok(fragment)) => {
                store.append_fragment(turn, &fragment)?;
                on_fragment(&fragment);
            }
            Some(Err(e)) => break e,
            None => {
                store.complete(turn)?;
                turn.finish()?;
                return Ok(TurnOutcome::Completed);
            }
        }
    };

    let outcome = match failure {
        StreamError::Backend(message) => {
            store.fail(turn, message.clone())?;
            TurnOutcome::BackendError(message)
        }
        transport => {
            tracing::warn!("Answer stream failed, using local answer: {}", transport);
            store.fail(turn, fallback())?;
            TurnOutcome::FellBack(transport.to_string())
        }
    };
    turn.finish()?;
    Ok(outcome)
}

pub struct ChatSession {
    context: RepoContext,
    client: AnalyzeClient,
    store: MessageStore,
}

impl ChatSession {
    pub fn new(context: RepoContext, client: AnalyzeClient) -> Self {
        Self { context, client, store: MessageStore::with_greeting() }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.store.messages()
    }

    pub fn context(&self) -> &RepoContext {
        &self.context
    }

    /// Reply to the most recent question, once `ask` has returned.
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.store.messages().last()
    }

    pub async fn ask(&mut self, question: &str) -> Result<TurnOutcome, ChatError> {
        self.ask_with(question, |_| {}).await
    }

    /// Ask `question`, calling `on_fragment` for every fragment as it lands.
    ///
    /// Only a blank question is an error; every network failure ends in a
    /// reply.
    pub async fn ask_with<F>(&mut self, question: &str, on_fragment: F) -> Result<TurnOutcome, ChatError>
    where
        F: FnMut(&str),
    {
        let mut turn = self.store.begin_turn(question)?;
        let request = AnalyzeRequest {
            repo: self.context.repo.clone(),
            tree: self.context.entries.clone(),
            question: Some(turn.question.clone()),
        };

        let context = &self.context;
        let question = turn.question.clone();
        let fallback = move || local_answer(&question, context.name(), &context.entries);

        match self.client.stream_answer(&request).await {
            Ok(decoder) => {
                drive_turn(&mut self.store, &mut turn, decoder.into_stream(), fallback, on_fragment)
                    .await
            }
            Err(e) => {
                tracing::warn!("Relay unavailable ({}), using local answer", e);
                self.store.fail(&mut turn, fallback())?;
                turn.finish()?;
                Ok(TurnOutcome::FellBack(e.to_string()))
            }
        }
    }
}
