//! Chat message storage and the per-turn state machine

use crate::domain::{ChatMessage, MessageStatus, Role};
use chrono::Utc;
use thiserror::Error;

pub const GREETING: &str = "I've analyzed the repository. What would you like to know?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Sending,
    Streaming,
    Completed,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Please enter a question")]
    EmptyQuestion,

    #[error("No message with id {0}")]
    UnknownMessage(u64),

    #[error("Message {0} is already finalized")]
    MessageFinalized(u64),

    #[error("Invalid turn transition from {from:?} to {to:?}")]
    InvalidTransition { from: TurnState, to: TurnState },
}

/// One question/answer exchange. Fragments are routed by the assistant
/// message id it carries, so turns running side by side never mix.
#[derive(Debug)]
pub struct Turn {
    pub question: String,
    pub user_id: u64,
    pub assistant_id: u64,
    state: TurnState,
}

impl Turn {
    pub fn state(&self) -> TurnState {
        self.state
    }

    fn advance(&mut self, to: TurnState) -> Result<(), ChatError> {
        use TurnState::*;
        let allowed = matches!(
            (self.state, to),
            (Idle, Sending)
                | (Sending, Streaming)
                | (Streaming, Streaming)
                | (Streaming, Completed)
                | (Sending, Failed)
                | (Streaming, Failed)
                | (Completed, Idle)
                | (Failed, Idle)
        );
        if !allowed {
            return Err(ChatError::InvalidTransition { from: self.state, to });
        }
        self.state = to;
        Ok(())
    }

    /// Return to `Idle` once the turn has completed or failed.
    pub fn finish(&mut self) -> Result<(), ChatError> {
        self.advance(TurnState::Idle)
    }
}

/// Ordered, append-only chat history for one session.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the assistant's opening line.
    pub fn with_greeting() -> Self {
        let mut store = Self::new();
        store.push(Role::Assistant, GREETING.to_string(), MessageStatus::Done);
        store
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn get(&self, id: u64) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    fn push(&mut self, role: Role, text: String, status: MessageStatus) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(ChatMessage { id, role, text, status, created_at: Utc::now() });
        id
    }

    fn open_message(&mut self, id: u64) -> Result<&mut ChatMessage, ChatError> {
        let message =
            self.messages.iter_mut().find(|m| m.id == id).ok_or(ChatError::UnknownMessage(id))?;
        if message.status.is_final() {
            return Err(ChatError::MessageFinalized(id));
        }
        Ok(message)
    }

    /// Record the question and a pending assistant reply. Both ids are fixed
    /// here, before any network traffic.
    pub fn begin_turn(&mut self, question: &str) -> Result<Turn, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }
        let user_id = self.push(Role::User, question.to_string(), MessageStatus::Done);
        let assistant_id = self.push(Role::Assistant, String::new(), MessageStatus::Pending);

        let mut turn =
            Turn { question: question.to_string(), user_id, assistant_id, state: TurnState::Idle };
        turn.advance(TurnState::Sending)?;
        Ok(turn)
    }

    pub fn append_fragment(&mut self, turn: &mut Turn, fragment: &str) -> Result<(), ChatError> {
        turn.advance(TurnState::Streaming)?;
        let message = self.open_message(turn.assistant_id)?;
        message.text.push_str(fragment);
        message.status = MessageStatus::Streaming;
        Ok(())
    }

    /// Sentinel received. A turn that saw no fragments passes through
    /// `Streaming` on the way.
    pub fn complete(&mut self, turn: &mut Turn) -> Result<(), ChatError> {
        if turn.state == TurnState::Sending {
            turn.advance(TurnState::Streaming)?;
        }
        turn.advance(TurnState::Completed)?;
        self.open_message(turn.assistant_id)?.status = MessageStatus::Done;
        Ok(())
    }

    /// Mark the reply failed, replacing whatever streamed so far with
    /// `replacement`.
    pub fn fail(&mut self, turn: &mut Turn, replacement: String) -> Result<(), ChatError> {
        turn.advance(TurnState::Failed)?;
        let message = self.open_message(turn.assistant_id)?;
        message.text = replacement;
        message.status = MessageStatus::Failed;
        Ok(())
    }
}
