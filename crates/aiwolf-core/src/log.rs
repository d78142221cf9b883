//! Tabular game log rows handed to agents in diffed mode

use serde::{Deserialize, Serialize};

use crate::agent::AgentIdx;

/// What a log row records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Initialize,
    Talk,
    Whisper,
    Vote,
    AttackVote,
    Divine,
    Identify,
    Guard,
    Execute,
    Dead,
    Attack,
    Finish,
}

/// One row of the game log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRow {
    pub day: i64,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub idx: i64,
    pub turn: i64,
    pub agent: AgentIdx,
    pub text: String,
}

impl LogRow {
    pub fn new(
        day: i64,
        kind: LogKind,
        idx: i64,
        turn: i64,
        agent: AgentIdx,
        text: impl Into<String>,
    ) -> Self {
        Self {
            day,
            kind,
            idx,
            turn,
            agent,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_serializes_type_field() {
        let row = LogRow::new(1, LogKind::AttackVote, 3, 0, 5, "ATTACK Agent[03]");
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains(r#""type":"attack_vote""#), "{}", json);
    }
}
