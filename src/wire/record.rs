//! Relay records and their `data:` framing

/// Payload marking normal end of stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Prefix of a payload carrying a failure message.
pub const ERROR_TAG: &str = "[ERROR]";

/// One self-delimited unit on the relay stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Fragment(String),
    Done,
    Error(String),
}

impl Record {
    /// Interpret the payload of one complete event.
    ///
    /// A fragment whose text is exactly `[DONE]` or starts with `[ERROR]` is
    /// indistinguishable from the control records.
    pub fn from_data(data: String) -> Self {
        if data == DONE_SENTINEL {
            Record::Done
        } else if let Some(message) = data.strip_prefix(ERROR_TAG) {
            Record::Error(message.trim_start().to_string())
        } else {
            Record::Fragment(data)
        }
    }

    fn payload(&self) -> String {
        match self {
            Record::Fragment(text) => text.clone(),
            Record::Done => DONE_SENTINEL.to_string(),
            Record::Error(message) => format!("{ERROR_TAG} {message}"),
        }
    }

    /// Frame as `data: <payload>\n\n`. Embedded newlines become extra `data:`
    /// lines, which the decoder joins back with `\n`.
    pub fn encode(&self) -> String {
        let payload = self.payload();
        let mut out = String::with_capacity(payload.len() + 8);
        for line in payload.split('\n') {
            out.push_str("data: ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}
