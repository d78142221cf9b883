//! # aiwolf-core
//!
//! Core types and traits for the AIWolf agent protocol.
//!
//! This crate provides the foundational types shared by the bridge crates:
//! - Server requests and decoded messages
//! - Session-scoped base info and the whisper watermark
//! - Talk content and game log rows
//! - The `Agent` trait implemented by participants

pub mod agent;
pub mod base_info;
pub mod content;
pub mod error;
pub mod log;
pub mod message;
pub mod request;
pub mod watermark;

pub use agent::{Agent, AgentIdx, AgentView};
pub use base_info::BaseInfo;
pub use content::{AgentRef, Content, Role, Species};
pub use error::{Result, WolfError};
pub use log::{LogKind, LogRow};
pub use message::{GameInfo, GameSetting, InboundMessage, Judge, Reply, Talk, TargetReply, Vote};
pub use request::Request;
pub use watermark::WhisperWatermark;
