//! Agent trait and the views it receives

use async_trait::async_trait;
use serde_json::Value;

use crate::base_info::BaseInfo;
use crate::content::Content;
use crate::error::Result;
use crate::log::LogRow;
use crate::message::{GameInfo, GameSetting};
use crate::request::Request;

/// Player index as used by the server (1-based)
pub type AgentIdx = i32;

/// What the agent gets to see on initialize/update
#[derive(Debug, Clone, PartialEq)]
pub enum AgentView {
    /// Snapshot forwarded untouched
    Raw {
        game_info: GameInfo,
        talk_history: Vec<Value>,
        whisper_history: Vec<Value>,
    },
    /// Persistent base info plus log rows added since the previous call
    Diffed { base_info: BaseInfo, diff: Vec<LogRow> },
}

impl AgentView {
    /// Agents currently `ALIVE`, in index order
    pub fn alive_agents(&self) -> Vec<AgentIdx> {
        match self {
            AgentView::Raw { game_info, .. } => {
                let status_map = game_info.get("statusMap").cloned();
                BaseInfo {
                    status_map,
                    ..Default::default()
                }
                .alive_agents()
            }
            AgentView::Diffed { base_info, .. } => base_info.alive_agents(),
        }
    }

    /// Own index, when the view carries it
    pub fn me(&self) -> Option<AgentIdx> {
        match self {
            AgentView::Raw { game_info, .. } => game_info
                .get("agent")
                .and_then(|v| v.as_i64())
                .and_then(|v| AgentIdx::try_from(v).ok()),
            AgentView::Diffed { base_info, .. } => Some(base_info.agent_idx),
        }
    }
}

/// A game participant
///
/// The bridge calls `update` before every turn-level callback, so
/// `vote`, `talk` and friends can rely on state gathered there.
#[async_trait]
pub trait Agent: Send {
    /// Start of a game
    async fn initialize(&mut self, view: &AgentView, setting: &GameSetting) -> Result<()>;

    /// New information for `request`
    async fn update(&mut self, view: &AgentView, request: &Request) -> Result<()>;

    /// Start of a day, after the DAILY_INITIALIZE update
    async fn day_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// End of a game, after the FINISH update
    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    async fn vote(&mut self) -> Result<AgentIdx>;

    async fn attack(&mut self) -> Result<AgentIdx>;

    async fn guard(&mut self) -> Result<AgentIdx>;

    async fn divine(&mut self) -> Result<AgentIdx>;

    async fn talk(&mut self) -> Result<Content>;

    async fn whisper(&mut self) -> Result<Content>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_view_reads_snapshot() {
        let game_info = json!({
            "agent": 3,
            "statusMap": {"1": "ALIVE", "3": "ALIVE", "2": "DEAD", "10": "ALIVE"}
        })
        .as_object()
        .cloned()
        .unwrap();
        let view = AgentView::Raw {
            game_info,
            talk_history: vec![],
            whisper_history: vec![],
        };

        assert_eq!(view.me(), Some(3));
        assert_eq!(view.alive_agents(), vec![1, 3, 10]);
    }

    #[test]
    fn test_diffed_view_uses_base_info() {
        let view = AgentView::Diffed {
            base_info: BaseInfo {
                agent_idx: 5,
                ..Default::default()
            },
            diff: vec![],
        };
        assert_eq!(view.me(), Some(5));
        assert!(view.alive_agents().is_empty());
    }
}
