//! Session-scoped facts about the running game

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::agent::AgentIdx;
use crate::error::{Result, WolfError};
use crate::message::GameInfo;

/// Snapshot keys copied into [`BaseInfo`] on every update
pub const TURN_KEYS: [&str; 4] = ["day", "remainTalkMap", "remainWhisperMap", "statusMap"];

/// Fields that persist across turns within one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseInfo {
    pub agent_idx: AgentIdx,
    pub my_role: String,
    pub role_map: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remain_talk_map: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remain_whisper_map: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_map: Option<serde_json::Value>,
}

impl BaseInfo {
    /// Build from the INITIALIZE snapshot
    pub fn from_initialize(game_info: &GameInfo) -> Result<Self> {
        let agent_idx = game_info
            .get("agent")
            .and_then(|v| v.as_i64())
            .and_then(|v| AgentIdx::try_from(v).ok())
            .ok_or_else(|| WolfError::Protocol("INITIALIZE gameInfo has no agent index".into()))?;

        let role_map: BTreeMap<String, String> = match game_info.get("roleMap") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| WolfError::Protocol(format!("Invalid roleMap: {}", e)))?,
            None => {
                return Err(WolfError::Protocol(
                    "INITIALIZE gameInfo has no roleMap".into(),
                ));
            }
        };

        let my_role = role_map
            .get(&agent_idx.to_string())
            .cloned()
            .ok_or_else(|| {
                WolfError::Protocol(format!("roleMap has no entry for agent {}", agent_idx))
            })?;

        Ok(Self {
            agent_idx,
            my_role,
            role_map,
            ..Default::default()
        })
    }

    /// Copy the per-turn keys present in `game_info`
    pub fn merge_turn(&mut self, game_info: &GameInfo) {
        for key in TURN_KEYS {
            let Some(value) = game_info.get(key) else {
                continue;
            };
            let slot = match key {
                "day" => &mut self.day,
                "remainTalkMap" => &mut self.remain_talk_map,
                "remainWhisperMap" => &mut self.remain_whisper_map,
                _ => &mut self.status_map,
            };
            *slot = Some(value.clone());
        }
    }

    /// Current day, if the server has sent one
    pub fn day(&self) -> Option<i64> {
        self.day.as_ref().and_then(|d| d.as_i64())
    }

    /// Agents whose status is `ALIVE`
    pub fn alive_agents(&self) -> Vec<AgentIdx> {
        let Some(status) = self.status_map.as_ref().and_then(|s| s.as_object()) else {
            return Vec::new();
        };
        let mut alive: Vec<AgentIdx> = status
            .iter()
            .filter(|(_, v)| v.as_str() == Some("ALIVE"))
            .filter_map(|(k, _)| k.parse().ok())
            .collect();
        alive.sort_unstable();
        alive
    }
}
