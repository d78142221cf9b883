//! TCP transport for the game server connection

use crate::transport::{StreamReader, StreamWriter};
use aiwolf_core::{Result, WolfError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::info;

/// TCP read half
pub type TcpReader = StreamReader<OwnedReadHalf>;

/// TCP write half
pub type TcpWriter = StreamWriter<OwnedWriteHalf>;

/// Connect to the game server
///
/// `timeout` bounds the connect itself and every later read.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<(TcpReader, TcpWriter)> {
    let addr = format!("{}:{}", host, port);
    info!("Connecting to game server at {}", addr);

    let stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| WolfError::Io(format!("Connection timeout to {}", addr)))?
        .map_err(|e| WolfError::Io(format!("Failed to connect to {}: {}", addr, e)))?;

    // Replies are small and latency-sensitive
    stream
        .set_nodelay(true)
        .map_err(|e| WolfError::Io(format!("Failed to set TCP_NODELAY: {}", e)))?;

    let (read_half, write_half) = stream.into_split();
    Ok((
        StreamReader::new(read_half, timeout),
        StreamWriter(write_half),
    ))
}
