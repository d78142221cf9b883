//! Frame assembly for the unprefixed JSON stream
//!
//! The server writes newline-separated JSON objects with no length field.
//! An assembler buffers socket reads until the buffer holds one or more
//! complete objects, then hands the whole buffer over as a frame.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use aiwolf_core::WolfError;

/// Largest frame an assembler will buffer (64 MiB)
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Accumulates socket reads into complete frames
pub trait FrameAssembler: Send {
    /// Append freshly read bytes
    ///
    /// Fails with a protocol error once the pending frame outgrows the limit.
    fn push(&mut self, chunk: &[u8]) -> Result<(), WolfError>;

    /// Remove and return the buffered text once it forms a complete frame
    fn take_frame(&mut self) -> Option<String>;

    /// Bytes currently buffered
    fn buffered(&self) -> usize;
}

fn check_size(buffered: usize, limit: usize) -> Result<(), WolfError> {
    if buffered > limit {
        return Err(WolfError::Protocol(format!(
            "Frame exceeds {} bytes without closing, stream is out of sync",
            limit
        )));
    }
    Ok(())
}

/// Completes a frame when `{` and `}` counts balance
///
/// Braces inside JSON strings are counted too, so chat text with an
/// unbalanced brace stalls or splits the stream.
#[derive(Debug)]
pub struct BraceCounter {
    buf: Vec<u8>,
    scanned: usize,
    depth: i64,
    max_frame_size: usize,
}

impl Default for BraceCounter {
    fn default() -> Self {
        Self::with_max_frame_size(MAX_FRAME_SIZE)
    }
}

impl BraceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            depth: 0,
            max_frame_size,
        }
    }
}

impl FrameAssembler for BraceCounter {
    fn push(&mut self, chunk: &[u8]) -> Result<(), WolfError> {
        self.buf.extend_from_slice(chunk);
        check_size(self.buf.len(), self.max_frame_size)
    }

    fn take_frame(&mut self) -> Option<String> {
        // Brace bytes never occur inside a multi-byte UTF-8 sequence
        for &byte in &self.buf[self.scanned..] {
            match byte {
                b'{' => self.depth += 1,
                b'}' => self.depth -= 1,
                _ => {}
            }
        }
        self.scanned = self.buf.len();

        if self.buf.is_empty() || self.depth != 0 {
            return None;
        }

        let frame = std::str::from_utf8(&self.buf).ok()?.to_owned();
        self.buf.clear();
        self.scanned = 0;
        Some(frame)
    }

    fn buffered(&self) -> usize {
        self.buf.len()
    }
}

/// Brace balancing that skips over JSON string literals
#[derive(Debug)]
pub struct JsonStreamAssembler {
    buf: Vec<u8>,
    scanned: usize,
    depth: i64,
    in_string: bool,
    escaped: bool,
    max_frame_size: usize,
}

impl Default for JsonStreamAssembler {
    fn default() -> Self {
        Self::with_max_frame_size(MAX_FRAME_SIZE)
    }
}

impl JsonStreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            depth: 0,
            in_string: false,
            escaped: false,
            max_frame_size,
        }
    }

    fn scan(&mut self) {
        for &byte in &self.buf[self.scanned..] {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }
            match byte {
                b'"' => self.in_string = true,
                b'{' => self.depth += 1,
                b'}' => self.depth -= 1,
                _ => {}
            }
        }
        self.scanned = self.buf.len();
    }
}

impl FrameAssembler for JsonStreamAssembler {
    fn push(&mut self, chunk: &[u8]) -> Result<(), WolfError> {
        self.buf.extend_from_slice(chunk);
        check_size(self.buf.len(), self.max_frame_size)
    }

    fn take_frame(&mut self) -> Option<String> {
        self.scan();
        if self.buf.is_empty() || self.depth != 0 || self.in_string {
            return None;
        }

        let frame = std::str::from_utf8(&self.buf).ok()?.to_owned();
        *self = Self::with_max_frame_size(self.max_frame_size);
        Some(frame)
    }

    fn buffered(&self) -> usize {
        self.buf.len()
    }
}

/// Which assembler a connection uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// [`BraceCounter`]
    #[default]
    Brace,
    /// [`JsonStreamAssembler`]
    Json,
}

impl Framing {
    pub fn assembler(self) -> Box<dyn FrameAssembler> {
        match self {
            Framing::Brace => Box::new(BraceCounter::new()),
            Framing::Json => Box::new(JsonStreamAssembler::new()),
        }
    }
}

impl FromStr for Framing {
    type Err = WolfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "brace" => Ok(Framing::Brace),
            "json" => Ok(Framing::Json),
            other => Err(WolfError::Config(format!("Unknown framing: {}", other))),
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::Brace => f.write_str("brace"),
            Framing::Json => f.write_str("json"),
        }
    }
}
