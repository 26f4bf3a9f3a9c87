//! Chat client: streaming transport, record decoding, message history and the
//! local fallback.

pub mod chat;
pub mod decoder;
pub mod fallback;
pub mod markdown;
pub mod store;
pub mod transport;

pub use chat::{drive_turn, ChatSession, TurnOutcome};
pub use decoder::{FragmentDecoder, StreamError};
pub use fallback::local_answer;
pub use markdown::tidy_markdown;
pub use store::{ChatError, MessageStore, Turn, TurnState, GREETING};
pub use transport::{AnalyzeClient, RelayByteStream, TransportError};
