//! Connection loop
//!
//! Reads frames from the server, dispatches every message they contain and
//! writes the replies back, until the configured number of games is done or
//! the server goes quiet.

use crate::adapter::AgentAdapter;
use crate::config::ProxyConfig;
use crate::dispatch::dispatch;
use crate::session::{Session, SessionSummary};
use aiwolf_bridge::{
    ChunkReader, ReplyWriter, decode_frame, encode_reply, normalize, read_frame, tcp,
};
use aiwolf_core::{Agent, Result};
use tracing::{debug, info, warn};

/// Drives one agent against the game server
pub struct AgentProxy<A> {
    config: ProxyConfig,
    agent: A,
}

impl<A: Agent> AgentProxy<A> {
    pub fn new(config: ProxyConfig, agent: A) -> Self {
        Self { config, agent }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn into_agent(self) -> A {
        self.agent
    }

    /// Connect over TCP and play until done
    ///
    /// The socket is shut down on every exit path.
    pub async fn connect_server(&mut self) -> Result<SessionSummary> {
        self.config.validate()?;
        let (mut reader, mut writer) = tcp::connect(
            &self.config.host,
            self.config.port,
            self.config.socket_timeout,
        )
        .await?;

        let result = self.run(&mut reader, &mut writer).await;

        if let Err(e) = writer.close().await {
            warn!("Failed to close connection: {}", e);
        }
        info!("Disconnected from {}:{}", self.config.host, self.config.port);
        result
    }

    /// Play over an already open transport with a fresh session
    pub async fn run<R, W>(&mut self, reader: &mut R, writer: &mut W) -> Result<SessionSummary>
    where
        R: ChunkReader + ?Sized,
        W: ReplyWriter + ?Sized,
    {
        let session = Session::new(self.config.total_games, AgentAdapter::new(self.config.mode));
        self.run_session(session, reader, writer).await
    }

    /// Play over an open transport, continuing `session`
    pub async fn run_session<R, W>(
        &mut self,
        mut session: Session,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<SessionSummary>
    where
        R: ChunkReader + ?Sized,
        W: ReplyWriter + ?Sized,
    {
        let mut assembler = self.config.framing.assembler();
        info!(
            "Playing {} game(s) as {} ({} mode, {} framing)",
            session.total_games(),
            self.config.identity.name,
            session.adapter().mode(),
            self.config.framing
        );

        while !session.is_complete() {
            let Some(frame) = read_frame(reader, &mut *assembler, &self.config.retry).await? else {
                info!("Server closed the stream");
                break;
            };

            for message in decode_frame(&frame) {
                let mut message = message?;
                normalize(&mut message, &mut session.watermark);

                let reply =
                    dispatch(&mut session, &self.config.identity, &mut self.agent, message).await?;
                if let Some(bytes) = encode_reply(&reply)? {
                    debug!(
                        "[Agent→Server] {}",
                        String::from_utf8_lossy(&bytes).trim_end()
                    );
                    writer.write_reply(&bytes).await?;
                }
            }
        }

        let summary = session.summary();
        info!(
            "Session over: {} started, {} finished",
            summary.games_started, summary.games_finished
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdapterMode;
    use aiwolf_bridge::{RetryPolicy, StreamReader, StreamWriter};
    use aiwolf_core::{AgentIdx, AgentView, Content, GameSetting, Request, WolfError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio_test::io::Builder;

    #[derive(Default)]
    struct FixedAgent {
        updates: Vec<Request>,
        whispers_seen: Vec<usize>,
    }

    #[async_trait]
    impl Agent for FixedAgent {
        async fn initialize(&mut self, _view: &AgentView, _setting: &GameSetting) -> Result<()> {
            Ok(())
        }

        async fn update(&mut self, view: &AgentView, request: &Request) -> Result<()> {
            self.updates.push(request.clone());
            if let AgentView::Raw { whisper_history, .. } = view {
                self.whispers_seen.push(whisper_history.len());
            }
            Ok(())
        }

        async fn vote(&mut self) -> Result<AgentIdx> {
            Ok(3)
        }

        async fn attack(&mut self) -> Result<AgentIdx> {
            Ok(1)
        }

        async fn guard(&mut self) -> Result<AgentIdx> {
            Ok(1)
        }

        async fn divine(&mut self) -> Result<AgentIdx> {
            Ok(1)
        }

        async fn talk(&mut self) -> Result<Content> {
            Ok(Content::Over)
        }

        async fn whisper(&mut self) -> Result<Content> {
            Ok(Content::Skip)
        }
    }

    /// Hands out queued chunks, then empty reads; counts reads
    struct ScriptedReader {
        chunks: VecDeque<Vec<u8>>,
        reads: usize,
    }

    impl ScriptedReader {
        fn new(lines: &[&str]) -> Self {
            Self {
                chunks: lines.iter().map(|l| l.as_bytes().to_vec()).collect(),
                reads: 0,
            }
        }
    }

    #[async_trait]
    impl ChunkReader for ScriptedReader {
        async fn read_chunk(&mut self) -> Result<Vec<u8>> {
            self.reads += 1;
            Ok(self.chunks.pop_front().unwrap_or_default())
        }
    }

    /// Collects replies in memory
    #[derive(Default)]
    struct Replies(Vec<String>);

    #[async_trait]
    impl ReplyWriter for Replies {
        async fn write_reply(&mut self, data: &[u8]) -> Result<()> {
            self.0.push(String::from_utf8_lossy(data).into_owned());
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    const INITIALIZE: &str = concat!(
        "{\"request\":\"INITIALIZE\",",
        "\"gameInfo\":{\"agent\":1,\"day\":0,\"roleMap\":{\"1\":\"VILLAGER\"}},",
        "\"gameSetting\":{\"playerNum\":5}}\n",
    );

    fn config(total_games: u32) -> ProxyConfig {
        ProxyConfig::default()
            .with_total_games(total_games)
            .with_retry(RetryPolicy::immediate(1))
    }

    #[tokio::test]
    async fn test_replies_over_mock_socket() {
        let mock_reader = Builder::new()
            .read(b"{\"request\":\"NAME\"}\n{\"request\":\"ROLE\"}\n")
            .read(INITIALIZE.as_bytes())
            .read(b"{\"request\":\"VOTE\",\"gameInfo\":{\"day\":1}}\n")
            .read(b"{\"request\":\"FINISH\"}\n")
            .build();
        let mock_writer = Builder::new()
            .write(b"wolfy\n")
            .write(b"none\n")
            .write(b"{\"agentIdx\":3}\n")
            .build();

        let mut reader = StreamReader::new(mock_reader, Duration::from_secs(5));
        let mut writer = StreamWriter(mock_writer);
        let mut proxy = AgentProxy::new(
            config(1).with_identity("wolfy", "none"),
            FixedAgent::default(),
        );

        let summary = proxy.run(&mut reader, &mut writer).await.unwrap();
        assert_eq!(
            summary,
            SessionSummary {
                games_started: 1,
                games_finished: 1
            }
        );
        assert_eq!(proxy.agent().updates, vec![Request::Vote, Request::Finish]);
    }

    #[tokio::test]
    async fn test_stops_reading_after_last_game() {
        let mut reader = ScriptedReader::new(&[
            INITIALIZE,
            "{\"request\":\"FINISH\"}\n",
            "{\"request\":\"NAME\"}\n",
        ]);
        let mut writer = Replies::default();
        let mut proxy = AgentProxy::new(config(1), FixedAgent::default());

        proxy.run(&mut reader, &mut writer).await.unwrap();

        assert_eq!(reader.reads, 2);
        assert!(writer.0.is_empty());
    }

    #[tokio::test]
    async fn test_whole_frame_dispatched_after_last_finish() {
        let frame = format!("{}{{\"request\":\"FINISH\"}}\n{{\"request\":\"NAME\"}}\n", INITIALIZE);
        let mut reader = ScriptedReader::new(&[&frame]);
        let mut writer = Replies::default();
        let mut proxy = AgentProxy::new(config(1), FixedAgent::default());

        let summary = proxy.run(&mut reader, &mut writer).await.unwrap();

        assert_eq!(summary.games_finished, 1);
        assert_eq!(writer.0, vec!["aiwolf-rs\n"]);
        assert_eq!(reader.reads, 1);
    }

    #[tokio::test]
    async fn test_end_of_stream_is_not_an_error() {
        let mut reader = ScriptedReader::new(&["{\"request\":\"NAME\"}\n"]);
        let mut writer = Replies::default();
        let mut proxy = AgentProxy::new(config(5), FixedAgent::default());

        let summary = proxy.run(&mut reader, &mut writer).await.unwrap();

        assert_eq!(summary, SessionSummary::default());
        assert_eq!(writer.0, vec!["aiwolf-rs\n"]);
    }

    #[tokio::test]
    async fn test_malformed_line_ends_loop() {
        let mut reader = ScriptedReader::new(&["{\"request\":\"NAME\"}\n{\"oops\"}\n"]);
        let mut writer = Replies::default();
        let mut proxy = AgentProxy::new(config(1), FixedAgent::default());

        let err = proxy.run(&mut reader, &mut writer).await.unwrap_err();

        assert!(matches!(err, WolfError::Serialization(_)), "{:?}", err);
        assert_eq!(writer.0, vec!["aiwolf-rs\n"]);
    }

    #[tokio::test]
    async fn test_whisper_history_comes_from_watermark() {
        let mut reader = ScriptedReader::new(&[
            "{\"request\":\"WHISPER\",\"gameInfo\":{\"whisperList\":[{\"idx\":0}]}}\n",
            "{\"request\":\"WHISPER\",\"gameInfo\":{\"whisperList\":[{\"idx\":0},{\"idx\":1}]}}\n",
        ]);
        let mut writer = Replies::default();
        let mut proxy = AgentProxy::new(
            config(1).with_mode(AdapterMode::Raw),
            FixedAgent::default(),
        );
        let session = Session::new(1, AgentAdapter::new(AdapterMode::Raw));

        proxy
            .run_session(session, &mut reader, &mut writer)
            .await
            .unwrap();
        assert_eq!(writer.0, vec!["Skip\n", "Skip\n"]);
        assert_eq!(proxy.agent().whispers_seen, vec![1, 1]);
    }

    #[tokio::test]
    async fn test_new_day_in_same_frame_restarts_whispers() {
        let frame = concat!(
            "{\"request\":\"WHISPER\",",
            "\"gameInfo\":{\"whisperList\":[{\"idx\":0},{\"idx\":1},{\"idx\":2}]}}\n",
            "{\"request\":\"DAILY_INITIALIZE\",\"gameInfo\":{\"day\":2,\"whisperList\":[]}}\n",
            "{\"request\":\"WHISPER\",\"gameInfo\":{\"whisperList\":[{\"idx\":0}]}}\n",
        );
        let mut reader = ScriptedReader::new(&[frame]);
        let mut writer = Replies::default();
        let mut proxy = AgentProxy::new(
            config(1).with_mode(AdapterMode::Raw),
            FixedAgent::default(),
        );

        proxy.run(&mut reader, &mut writer).await.unwrap();

        assert_eq!(proxy.agent().whispers_seen, vec![3, 0, 1]);
        assert_eq!(writer.0, vec!["Skip\n", "Skip\n"]);
    }
}
