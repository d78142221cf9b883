//! Wire layer for AIWolf agents
//!
//! This crate provides:
//! - Frame assemblers for the unprefixed JSON stream
//! - Message decoding, snapshot normalization and reply encoding
//! - Transport abstractions (ChunkReader/ReplyWriter traits) and the frame read loop
//! - TCP transport

pub mod frame;
pub mod protocol;
pub mod tcp;
pub mod transport;

pub use frame::{BraceCounter, FrameAssembler, Framing, JsonStreamAssembler, MAX_FRAME_SIZE};
pub use protocol::{Messages, decode_frame, decode_line, encode_reply, normalize};
pub use transport::{ChunkReader, ReplyWriter, RetryPolicy, StreamReader, StreamWriter, read_frame};
