//! Inbound messages, replies and the game-info entries inside them

use serde::{Deserialize, Deserializer, Serialize};

use crate::agent::AgentIdx;
use crate::request::Request;

/// Full game-state snapshot resent by the server each turn
pub type GameInfo = serde_json::Map<String, serde_json::Value>;

/// Game settings sent once with INITIALIZE
pub type GameSetting = serde_json::Map<String, serde_json::Value>;

/// One decoded server message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    pub request: Request,
    #[serde(default, deserialize_with = "null_as_default")]
    pub game_info: GameInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub talk_history: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub whisper_history: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_setting: Option<GameSetting>,
}

impl InboundMessage {
    /// Message carrying only a request and an empty snapshot
    pub fn new(request: Request) -> Self {
        Self {
            request,
            game_info: GameInfo::new(),
            talk_history: Vec::new(),
            whisper_history: Vec::new(),
            game_setting: None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// What to write back for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing is written
    Empty,
    /// Bare text line (name, role, talk content)
    Text(String),
    /// Target of an action request
    Target(AgentIdx),
}

/// Wire body of an action reply
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetReply {
    #[serde(rename = "agentIdx")]
    pub agent_idx: AgentIdx,
}

/// Entry of `talkHistory` / `whisperHistory`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Talk {
    #[serde(default)]
    pub idx: i64,
    #[serde(default)]
    pub day: i64,
    #[serde(default)]
    pub turn: i64,
    pub agent: AgentIdx,
    pub text: String,
}

/// Entry of `voteList` / `attackVoteList`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    #[serde(default)]
    pub day: i64,
    pub agent: AgentIdx,
    pub target: AgentIdx,
}

/// `divineResult` / `mediumResult`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Judge {
    #[serde(default)]
    pub day: i64,
    pub agent: AgentIdx,
    pub target: AgentIdx,
    pub result: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_fields_default_to_empty() {
        let json = r#"{"request":"TALK","gameInfo":null,"talkHistory":null,"whisperHistory":null}"#;
        let msg: InboundMessage = serde_json::from_str(json).unwrap();

        assert_eq!(msg.request, Request::Talk);
        assert!(msg.game_info.is_empty());
        assert!(msg.talk_history.is_empty());
        assert!(msg.whisper_history.is_empty());
        assert!(msg.game_setting.is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let msg: InboundMessage = serde_json::from_str(r#"{"request":"NAME"}"#).unwrap();
        assert_eq!(msg, InboundMessage::new(Request::Name));
    }

    #[test]
    fn test_missing_request_is_rejected() {
        let result = serde_json::from_str::<InboundMessage>(r#"{"gameInfo":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_initialize_keeps_game_setting() {
        let json = concat!(
            r#"{"request":"INITIALIZE","gameInfo":{"agent":2},"#,
            r#""gameSetting":{"playerNum":5}}"#,
        );
        let msg: InboundMessage = serde_json::from_str(json).unwrap();

        let setting = msg.game_setting.unwrap();
        assert_eq!(setting.get("playerNum").unwrap(), 5);
        assert_eq!(msg.game_info.get("agent").unwrap(), 2);
    }

    #[test]
    fn test_target_reply_is_compact() {
        let json = serde_json::to_string(&TargetReply { agent_idx: 3 }).unwrap();
        assert_eq!(json, r#"{"agentIdx":3}"#);
    }

    #[test]
    fn test_talk_entry_ignores_extra_fields() {
        let json = r#"{"idx":4,"day":1,"turn":2,"agent":3,"text":"Over","skip":false,"over":true}"#;
        let talk: Talk = serde_json::from_str(json).unwrap();
        assert_eq!(talk.agent, 3);
        assert_eq!(talk.text, "Over");
        assert_eq!(talk.turn, 2);
    }
}
