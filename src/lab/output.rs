//! Output of the current run: console log and the runtime error slot.

use std::collections::VecDeque;

/// Default cap on retained log entries.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 1000;

/// Console output and latest runtime error of one run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    logs: VecDeque<String>,
    error: Option<String>,
    max_logs: usize,
    /// Entries dropped from the front since the last clear.
    dropped: usize,
}

impl RunOutput {
    pub fn new(max_logs: usize) -> Self {
        Self {
            logs: VecDeque::new(),
            error: None,
            max_logs: max_logs.max(1),
            dropped: 0,
        }
    }

    /// Append one console line, dropping the oldest past the cap.
    pub fn push_log(&mut self, line: String) {
        if self.logs.len() == self.max_logs {
            self.logs.pop_front();
            self.dropped += 1;
        }
        self.logs.push_back(line);
    }

    /// Replace the error slot. Only the latest error is kept.
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn clear(&mut self) {
        self.logs.clear();
        self.error = None;
        self.dropped = 0;
    }

    pub fn logs(&self) -> impl ExactSizeIterator<Item = &str> {
        self.logs.iter().map(String::as_str)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.error.is_none()
    }
}

impl Default for RunOutput {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOG_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_keep_order() {
        let mut out = RunOutput::default();
        out.push_log("a".into());
        out.push_log("b".into());
        assert_eq!(out.logs().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_error_overwrites() {
        let mut out = RunOutput::default();
        out.set_error("first".into());
        out.set_error("second".into());
        assert_eq!(out.error(), Some("second"));
        assert_eq!(out.logs().len(), 0);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut out = RunOutput::new(2);
        for line in ["1", "2", "3"] {
            out.push_log(line.into());
        }
        assert_eq!(out.logs().collect::<Vec<_>>(), ["2", "3"]);
        assert_eq!(out.dropped(), 1);

        out.clear();
        assert!(out.is_empty());
        assert_eq!(out.dropped(), 0);
    }
}
