//! Wire protocol for server <-> agent communication
//!
//! Inbound frames hold one JSON object per line. Replies are a bare text
//! line, a compact `{"agentIdx":N}` line, or nothing at all.

use aiwolf_core::{InboundMessage, Reply, Result, TargetReply, WhisperWatermark, WolfError};
use std::str::Lines;

/// Lazily decoded messages of one frame
pub struct Messages<'a> {
    lines: Lines<'a>,
}

impl Iterator for Messages<'_> {
    type Item = Result<InboundMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.by_ref().find(|l| !l.trim().is_empty())?;
        Some(decode_line(line))
    }
}

/// Split a completed frame into messages, one per non-empty line
pub fn decode_frame(frame: &str) -> Messages<'_> {
    Messages {
        lines: frame.lines(),
    }
}

/// Decode a single JSON line
pub fn decode_line(line: &str) -> Result<InboundMessage> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    serde_json::from_value(value)
        .map_err(|e| WolfError::Protocol(format!("Unexpected message shape: {}", e)))
}

/// Strip list snapshots the agent should not see in full
///
/// `talkList` is dropped in favour of `talkHistory`. `whisperList` is cut
/// at the watermark and replaces `whisperHistory`.
pub fn normalize(message: &mut InboundMessage, watermark: &mut WhisperWatermark) {
    message.game_info.remove("talkList");

    if let Some(list) = message.game_info.remove("whisperList") {
        let list = match list {
            serde_json::Value::Array(items) => items,
            _ => Vec::new(),
        };
        message.whisper_history = watermark.advance(&list);
    }
}

/// Bytes to write for a reply, newline included
pub fn encode_reply(reply: &Reply) -> Result<Option<Vec<u8>>> {
    let mut line = match reply {
        Reply::Empty => return Ok(None),
        Reply::Text(text) => text.clone().into_bytes(),
        Reply::Target(agent_idx) => serde_json::to_vec(&TargetReply {
            agent_idx: *agent_idx,
        })?,
    };
    line.push(b'\n');
    Ok(Some(line))
}
