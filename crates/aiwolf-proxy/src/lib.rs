//! AIWolf agent proxy
//!
//! Connects a pluggable [`Agent`](aiwolf_core::Agent) to an AIWolf game
//! server. This crate provides:
//! - `AgentProxy`, the connection loop
//! - Request dispatch over an explicit `Session`
//! - The raw/diffed agent adapter and the default table parser
//! - Connection configuration

pub mod adapter;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod parser;
pub mod session;

pub use adapter::AgentAdapter;
pub use config::{AdapterMode, DEFAULT_PORT, Identity, ProxyConfig};
pub use connection::AgentProxy;
pub use dispatch::dispatch;
pub use parser::{GameInfoParser, TableParser};
pub use session::{Session, SessionSummary};
