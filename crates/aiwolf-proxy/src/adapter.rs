//! Shapes the server snapshot for the agent
//!
//! The adapter only decides what the agent sees, never whether it is called.

use crate::config::AdapterMode;
use crate::parser::{GameInfoParser, TableParser};
use aiwolf_core::{AgentView, BaseInfo, GameSetting, InboundMessage, Result};
use std::fmt;

pub struct AgentAdapter {
    mode: AdapterMode,
    parser: Box<dyn GameInfoParser>,
}

impl AgentAdapter {
    /// Adapter using the default table parser
    pub fn new(mode: AdapterMode) -> Self {
        Self::with_parser(mode, Box::new(TableParser::new()))
    }

    /// Adapter with a custom parser for diffed mode
    pub fn with_parser(mode: AdapterMode, parser: Box<dyn GameInfoParser>) -> Self {
        Self { mode, parser }
    }

    pub fn mode(&self) -> AdapterMode {
        self.mode
    }

    /// View for INITIALIZE
    pub fn initialize_view(
        &mut self,
        message: &InboundMessage,
        setting: &GameSetting,
        base_info: &BaseInfo,
    ) -> Result<AgentView> {
        match self.mode {
            AdapterMode::Raw => Ok(raw_view(message)),
            AdapterMode::Diffed => {
                self.parser.initialize(&message.game_info, setting)?;
                Ok(AgentView::Diffed {
                    base_info: base_info.clone(),
                    diff: self.parser.take_diff(),
                })
            }
        }
    }

    /// View for every update-class request
    pub fn update_view(
        &mut self,
        message: &InboundMessage,
        base_info: &BaseInfo,
    ) -> Result<AgentView> {
        match self.mode {
            AdapterMode::Raw => Ok(raw_view(message)),
            AdapterMode::Diffed => {
                self.parser.update(
                    &message.game_info,
                    &message.talk_history,
                    &message.whisper_history,
                    &message.request,
                )?;
                Ok(AgentView::Diffed {
                    base_info: base_info.clone(),
                    diff: self.parser.take_diff(),
                })
            }
        }
    }
}

impl fmt::Debug for AgentAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentAdapter")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn raw_view(message: &InboundMessage) -> AgentView {
    AgentView::Raw {
        game_info: message.game_info.clone(),
        talk_history: message.talk_history.clone(),
        whisper_history: message.whisper_history.clone(),
    }
}
