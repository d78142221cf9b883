//! Talk and whisper content in the AIWolf protocol language

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agent::AgentIdx;

/// Game roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Villager,
    Seer,
    Medium,
    Bodyguard,
    Werewolf,
    Possessed,
    Fox,
    Freemason,
    Any,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Villager => "VILLAGER",
            Role::Seer => "SEER",
            Role::Medium => "MEDIUM",
            Role::Bodyguard => "BODYGUARD",
            Role::Werewolf => "WEREWOLF",
            Role::Possessed => "POSSESSED",
            Role::Fox => "FOX",
            Role::Freemason => "FREEMASON",
            Role::Any => "ANY",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Divination / identification results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Species {
    Human,
    Werewolf,
    Any,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Human => "HUMAN",
            Species::Werewolf => "WEREWOLF",
            Species::Any => "ANY",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Agent[NN]` reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentRef(pub AgentIdx);

impl fmt::Display for AgentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent[{:02}]", self.0)
    }
}

/// One utterance returned from `talk` or `whisper`
///
/// The server receives the `Display` form as a bare line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Nothing more to say today
    Over,
    /// Pass this turn
    Skip,
    Estimate { target: AgentIdx, role: Role },
    ComingOut { target: AgentIdx, role: Role },
    Divination { target: AgentIdx },
    Divined { target: AgentIdx, species: Species },
    Identified { target: AgentIdx, species: Species },
    Guard { target: AgentIdx },
    Guarded { target: AgentIdx },
    Vote { target: AgentIdx },
    Attack { target: AgentIdx },
    Agree { day: i64, id: i64 },
    Disagree { day: i64, id: i64 },
    /// Sent verbatim
    Text(String),
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Over => f.write_str("Over"),
            Content::Skip => f.write_str("Skip"),
            Content::Estimate { target, role } => {
                write!(f, "ESTIMATE {} {}", AgentRef(*target), role)
            }
            Content::ComingOut { target, role } => {
                write!(f, "COMINGOUT {} {}", AgentRef(*target), role)
            }
            Content::Divination { target } => write!(f, "DIVINATION {}", AgentRef(*target)),
            Content::Divined { target, species } => {
                write!(f, "DIVINED {} {}", AgentRef(*target), species)
            }
            Content::Identified { target, species } => {
                write!(f, "IDENTIFIED {} {}", AgentRef(*target), species)
            }
            Content::Guard { target } => write!(f, "GUARD {}", AgentRef(*target)),
            Content::Guarded { target } => write!(f, "GUARDED {}", AgentRef(*target)),
            Content::Vote { target } => write!(f, "VOTE {}", AgentRef(*target)),
            Content::Attack { target } => write!(f, "ATTACK {}", AgentRef(*target)),
            Content::Agree { day, id } => write!(f, "AGREE TALK day{} ID:{}", day, id),
            Content::Disagree { day, id } => write!(f, "DISAGREE TALK day{} ID:{}", day, id),
            Content::Text(text) => f.write_str(text),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}
