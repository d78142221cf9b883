//! Connection and participant configuration

use aiwolf_bridge::{Framing, RetryPolicy};
use aiwolf_core::{Result, WolfError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default AIWolf server port
pub const DEFAULT_PORT: u16 = 10000;

/// Shape of the data handed to the agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterMode {
    /// Snapshot forwarded untouched
    Raw,
    /// Base info plus game-log rows added since the last call
    #[default]
    Diffed,
}

impl FromStr for AdapterMode {
    type Err = WolfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(AdapterMode::Raw),
            "diffed" => Ok(AdapterMode::Diffed),
            other => Err(WolfError::Config(format!("Unknown adapter mode: {}", other))),
        }
    }
}

impl fmt::Display for AdapterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterMode::Raw => f.write_str("raw"),
            AdapterMode::Diffed => f.write_str("diffed"),
        }
    }
}

/// What the agent answers to NAME and ROLE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    /// Requested role, or `none` to let the server choose
    pub role: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "aiwolf-rs".into(),
            role: "none".into(),
        }
    }
}

/// Configuration for one agent connection
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Server host (default: localhost)
    pub host: String,
    /// Server port (default: 10000)
    pub port: u16,
    /// Bound on connect and on every socket read
    pub socket_timeout: Duration,
    /// Games to play before disconnecting
    pub total_games: u32,
    pub identity: Identity,
    pub mode: AdapterMode,
    pub framing: Framing,
    pub retry: RetryPolicy,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: DEFAULT_PORT,
            socket_timeout: Duration::from_secs(300),
            total_games: 5,
            identity: Identity::default(),
            mode: AdapterMode::default(),
            framing: Framing::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ProxyConfig {
    /// Config pointing at `host:port`
    pub fn with_server(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_identity(mut self, name: impl Into<String>, role: impl Into<String>) -> Self {
        self.identity = Identity {
            name: name.into(),
            role: role.into(),
        };
        self
    }

    pub fn with_total_games(mut self, total_games: u32) -> Self {
        self.total_games = total_games;
        self
    }

    pub fn with_mode(mut self, mode: AdapterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reject values the connection loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(WolfError::Config("host is empty".into()));
        }
        if self.identity.name.trim().is_empty() {
            return Err(WolfError::Config("agent name is empty".into()));
        }
        if self.socket_timeout.is_zero() {
            return Err(WolfError::Config("socket timeout must be positive".into()));
        }
        Ok(())
    }
}
