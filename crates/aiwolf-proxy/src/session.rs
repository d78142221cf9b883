//! Per-connection game state

use crate::adapter::AgentAdapter;
use aiwolf_core::{BaseInfo, WhisperWatermark};
use serde::Serialize;

/// Mutable state of one server connection
#[derive(Debug)]
pub struct Session {
    total_games: u32,
    games_started: u32,
    games_finished: u32,
    pub(crate) watermark: WhisperWatermark,
    pub(crate) base_info: BaseInfo,
    pub(crate) adapter: AgentAdapter,
}

/// Game counters reported when a connection ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub games_started: u32,
    pub games_finished: u32,
}

impl Session {
    pub fn new(total_games: u32, adapter: AgentAdapter) -> Self {
        Self {
            total_games,
            games_started: 0,
            games_finished: 0,
            watermark: WhisperWatermark::new(),
            base_info: BaseInfo::default(),
            adapter,
        }
    }

    /// Count an INITIALIZE
    pub fn start_game(&mut self) {
        self.games_started += 1;
    }

    /// Count a FINISH, returning whether it closed an open game
    ///
    /// A FINISH without an INITIALIZE since the previous one is ignored.
    pub fn finish_game(&mut self) -> bool {
        if self.games_started.checked_sub(1) == Some(self.games_finished) {
            self.games_finished += 1;
            true
        } else {
            false
        }
    }

    /// True once the configured number of games has finished
    pub fn is_complete(&self) -> bool {
        self.games_finished >= self.total_games
    }

    pub fn total_games(&self) -> u32 {
        self.total_games
    }

    pub fn games_started(&self) -> u32 {
        self.games_started
    }

    pub fn games_finished(&self) -> u32 {
        self.games_finished
    }

    pub fn base_info(&self) -> &BaseInfo {
        &self.base_info
    }

    pub fn watermark(&self) -> WhisperWatermark {
        self.watermark
    }

    pub fn adapter(&self) -> &AgentAdapter {
        &self.adapter
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            games_started: self.games_started,
            games_finished: self.games_finished,
        }
    }
}
