//! Server request kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// The `request` field of an inbound message
///
/// Known kinds get their own variant; anything else is kept verbatim in
/// `Other` so it can still be forwarded to the agent as a plain update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Request {
    Name,
    Role,
    Initialize,
    DailyInitialize,
    DailyFinish,
    Finish,
    Vote,
    Attack,
    Guard,
    Divine,
    Talk,
    Whisper,
    Other(String),
}

impl Request {
    /// Wire spelling of the request
    pub fn as_str(&self) -> &str {
        match self {
            Request::Name => "NAME",
            Request::Role => "ROLE",
            Request::Initialize => "INITIALIZE",
            Request::DailyInitialize => "DAILY_INITIALIZE",
            Request::DailyFinish => "DAILY_FINISH",
            Request::Finish => "FINISH",
            Request::Vote => "VOTE",
            Request::Attack => "ATTACK",
            Request::Guard => "GUARD",
            Request::Divine => "DIVINE",
            Request::Talk => "TALK",
            Request::Whisper => "WHISPER",
            Request::Other(name) => name,
        }
    }

    /// Requests that run the shared update step before their own action
    pub fn is_update(&self) -> bool {
        !matches!(self, Request::Name | Request::Role | Request::Initialize)
    }
}

impl From<&str> for Request {
    fn from(s: &str) -> Self {
        match s {
            "NAME" => Request::Name,
            "ROLE" => Request::Role,
            "INITIALIZE" => Request::Initialize,
            "DAILY_INITIALIZE" => Request::DailyInitialize,
            "DAILY_FINISH" => Request::DailyFinish,
            "FINISH" => Request::Finish,
            "VOTE" => Request::Vote,
            "ATTACK" => Request::Attack,
            "GUARD" => Request::Guard,
            "DIVINE" => Request::Divine,
            "TALK" => Request::Talk,
            "WHISPER" => Request::Whisper,
            other => Request::Other(other.to_string()),
        }
    }
}

impl From<String> for Request {
    fn from(s: String) -> Self {
        match Request::from(s.as_str()) {
            Request::Other(_) => Request::Other(s),
            known => known,
        }
    }
}

impl From<Request> for String {
    fn from(request: Request) -> Self {
        match request {
            Request::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
