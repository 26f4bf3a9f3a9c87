//! Streaming wire format shared by the relay, its client, and the upstream
//! completion backend: `data:` records separated by blank lines.

pub mod buffer;
pub mod record;

pub use buffer::EventBuffer;
pub use record::{Record, DONE_SENTINEL, ERROR_TAG};
