//! Wire messages for the car soccer simulator
//!
//! Uses postcard for compact binary serialization. Files of messages are a
//! sequence of frames, each a little-endian `u32` length followed by that
//! many bytes of one encoded message.

use std::io::{self, Read, Write};

use postcard::{from_bytes, to_allocvec};

/// Largest frame accepted by [`read_frame`]
pub const MAX_FRAME_LEN: u32 = 64 * 1024;

// ============================================================================
// C2S Messages (driver to simulator)
// ============================================================================

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum C2S {
    /// Keys held by one player for tick `seq`, as `KeySnapshot` bits
    Input { player_id: u8, keys: u8, seq: u32 },

    /// Stop the match
    Quit,
}

// ============================================================================
// S2C Messages (simulator to driver)
// ============================================================================

/// Pose of one car
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CarFrame {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Everything a renderer needs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateFrame {
    pub tick: u32,
    pub cars: [CarFrame; 2],
    pub ball_x: f32,
    pub ball_y: f32,
    pub score_left: u32,
    pub score_right: u32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum S2C {
    /// Post-tick state
    State(StateFrame),

    /// A goal was scored: 0 = left, 1 = right
    Goal { scorer: u8 },

    /// Cars and ball were put back at their spawn points
    Reset,
}

// ============================================================================
// Recordings
// ============================================================================

/// One entry of a recorded match file; tags which direction a message went
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Record {
    /// First entry of every recording: how the match was built.
    /// `config` is the match config as JSON.
    Header { walls: bool, config: String },
    Input(C2S),
    Output(S2C),
}

// ============================================================================
// Serialization Helpers
// ============================================================================

impl C2S {
    /// Serialize C2S message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    /// Deserialize C2S message from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }
}

impl S2C {
    /// Serialize S2C message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    /// Deserialize S2C message from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }
}

impl Record {
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }
}

// ============================================================================
// Framing
// ============================================================================

/// Write one length-prefixed frame
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let too_large = || io::Error::new(io::ErrorKind::InvalidInput, "frame too large");
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_LEN)
        .ok_or_else(too_large)?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)
}

/// Read one length-prefixed frame. `Ok(None)` on a clean end of stream;
/// a stream that ends inside a frame is an error.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    let len = u32::from_le_bytes(header);
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame length {len} exceeds {MAX_FRAME_LEN}"),
        ));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}
