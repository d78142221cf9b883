//! Sample agent picking random targets

use aiwolf_core::{Agent, AgentIdx, AgentView, Content, GameSetting, Request, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

/// Targets a random living agent other than itself and never talks
pub struct RandomAgent {
    me: Option<AgentIdx>,
    alive: Vec<AgentIdx>,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic choices for a given seed
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            me: None,
            alive: Vec::new(),
            rng,
        }
    }

    fn observe(&mut self, view: &AgentView) {
        if let Some(me) = view.me() {
            self.me = Some(me);
        }
        // Not every snapshot carries the status map
        let alive = view.alive_agents();
        if !alive.is_empty() {
            self.alive = alive;
        }
    }

    fn pick_target(&mut self) -> AgentIdx {
        let candidates: Vec<AgentIdx> = self
            .alive
            .iter()
            .copied()
            .filter(|&idx| Some(idx) != self.me)
            .collect();

        match candidates.choose(&mut self.rng) {
            Some(&target) => target,
            None => {
                let fallback = self.me.unwrap_or_default();
                warn!("No other living agent known, targeting {}", fallback);
                fallback
            }
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for RandomAgent {
    async fn initialize(&mut self, view: &AgentView, _setting: &GameSetting) -> Result<()> {
        self.me = None;
        self.alive.clear();
        self.observe(view);
        debug!("Initialized as agent {:?}", self.me);
        Ok(())
    }

    async fn update(&mut self, view: &AgentView, _request: &Request) -> Result<()> {
        self.observe(view);
        Ok(())
    }

    async fn vote(&mut self) -> Result<AgentIdx> {
        Ok(self.pick_target())
    }

    async fn attack(&mut self) -> Result<AgentIdx> {
        Ok(self.pick_target())
    }

    async fn guard(&mut self) -> Result<AgentIdx> {
        Ok(self.pick_target())
    }

    async fn divine(&mut self) -> Result<AgentIdx> {
        Ok(self.pick_target())
    }

    async fn talk(&mut self) -> Result<Content> {
        Ok(Content::Over)
    }

    async fn whisper(&mut self) -> Result<Content> {
        Ok(Content::Over)
    }
}
