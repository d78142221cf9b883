//! Delivered-prefix tracking for lists the server resends in full

use serde_json::Value;

/// Number of whisper-list entries already handed to the agent
///
/// The server resends the whole day's whisper list with every message; the
/// watermark turns those snapshots into the newly arrived suffix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WhisperWatermark(usize);

impl WhisperWatermark {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn position(&self) -> usize {
        self.0
    }

    /// Return the entries past the watermark and move it to the list end
    pub fn advance(&mut self, list: &[Value]) -> Vec<Value> {
        let fresh = list.get(self.0..).map(<[Value]>::to_vec).unwrap_or_default();
        self.0 = list.len();
        fresh
    }

    /// Start of a new day
    pub fn reset(&mut self) {
        self.0 = 0;
    }
}
