//! Incremental event splitting across read boundaries

/// Accumulates raw bytes and yields the `data` payload of every event once its
/// terminating blank line has arrived.
///
/// Lines end at `\n` (a preceding `\r` is dropped). Comment lines (`:`) and
/// fields other than `data` are ignored. Several `data` lines in one event are
/// joined with `\n`. Splitting on the `\n` byte never cuts a UTF-8 sequence,
/// so multi-byte characters straddling two reads decode intact.
#[derive(Debug, Default)]
pub struct EventBuffer {
    pending: Vec<u8>,
    data_lines: Vec<String>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one read's worth of bytes; returns the payloads completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(event) = self.process_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    /// `true` when bytes or lines of an unfinished event are buffered.
    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty() || !self.data_lines.is_empty()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data_lines.is_empty() {
                return None;
            }
            let event = self.data_lines.join("\n");
            self.data_lines.clear();
            return Some(event);
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data_lines.push(value.to_string());
        }
        None
    }
}
