// Copyright 2025 jonefeewang@gmail.com
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bytes::{Buf, BufMut, BytesMut};

use super::Flags;
use crate::{AppError, AppResult};

/// Size of the common frame header on the wire.
pub const FRAME_HEADER_SIZE: usize = 9;
/// Largest body length the 24-bit length field can carry.
pub const MAX_FRAME_LENGTH: u32 = (1 << 24) - 1;
/// Masks off the reserved top bit of a 32-bit stream identifier field.
pub(crate) const STREAM_ID_MASK: u32 = 0x7fff_ffff;

/// Frame type byte.
///
/// Any byte outside the ten known types decodes to `Unknown` so that the
/// registry can decide what to do with the frame body.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FrameType {
    Data,
    Headers,
    Priority,
    RstStream,
    Settings,
    PushPromise,
    Ping,
    GoAway,
    WindowUpdate,
    Continuation,
    Unknown(u8),
}

impl From<u8> for FrameType {
    fn from(value: u8) -> Self {
        match value {
            0x0 => FrameType::Data,
            0x1 => FrameType::Headers,
            0x2 => FrameType::Priority,
            0x3 => FrameType::RstStream,
            0x4 => FrameType::Settings,
            0x5 => FrameType::PushPromise,
            0x6 => FrameType::Ping,
            0x7 => FrameType::GoAway,
            0x8 => FrameType::WindowUpdate,
            0x9 => FrameType::Continuation,
            other => FrameType::Unknown(other),
        }
    }
}

impl From<FrameType> for u8 {
    fn from(value: FrameType) -> Self {
        match value {
            FrameType::Data => 0x0,
            FrameType::Headers => 0x1,
            FrameType::Priority => 0x2,
            FrameType::RstStream => 0x3,
            FrameType::Settings => 0x4,
            FrameType::PushPromise => 0x5,
            FrameType::Ping => 0x6,
            FrameType::GoAway => 0x7,
            FrameType::WindowUpdate => 0x8,
            FrameType::Continuation => 0x9,
            FrameType::Unknown(other) => other,
        }
    }
}

/// The 9-byte header that precedes every frame body.
///
/// ```text
/// +-----------------------------------------------+
/// |                 Length (24)                   |
/// +---------------+---------------+---------------+
/// |   Type (8)    |   Flags (8)   |
/// +-+-------------+---------------+-------------------------------+
/// |R|                 Stream Identifier (31)                      |
/// +-+-------------------------------------------------------------+
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// body length in bytes, the header itself is not counted
    pub length: u32,
    pub frame_type: FrameType,
    pub flags: Flags,
    pub stream_id: u32,
}

impl FrameHeader {
    pub fn new(frame_type: FrameType, flags: Flags, stream_id: u32, length: u32) -> Self {
        FrameHeader {
            length,
            frame_type,
            flags,
            stream_id: stream_id & STREAM_ID_MASK,
        }
    }

    /// Decodes a header from the first 9 bytes of `src`.
    ///
    /// The reserved bit of the stream identifier is dropped whatever its value.
    /// Fewer than 9 bytes yields `Incomplete` and nothing is returned.
    pub fn decode(mut src: &[u8]) -> AppResult<FrameHeader> {
        if src.len() < FRAME_HEADER_SIZE {
            return Err(AppError::Incomplete);
        }
        let length = src.get_uint(3) as u32;
        let frame_type = FrameType::from(src.get_u8());
        let flags = Flags::from_bits(src.get_u8());
        let stream_id = src.get_u32() & STREAM_ID_MASK;
        Ok(FrameHeader {
            length,
            frame_type,
            flags,
            stream_id,
        })
    }

    /// Appends exactly 9 bytes to `dst`. The reserved bit is always written as 0.
    pub fn encode(&self, dst: &mut BytesMut) -> AppResult<()> {
        if self.length > MAX_FRAME_LENGTH {
            return Err(AppError::FrameFormat(format!(
                "frame length {} does not fit in 24 bits",
                self.length
            )));
        }
        dst.reserve(FRAME_HEADER_SIZE);
        dst.put_uint(u64::from(self.length), 3);
        dst.put_u8(self.frame_type.into());
        dst.put_u8(self.flags.bits());
        dst.put_u32(self.stream_id & STREAM_ID_MASK);
        Ok(())
    }

    pub fn is_padded(&self) -> bool {
        self.flags.contains(Flags::PADDED)
    }
}
