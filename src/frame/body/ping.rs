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

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{expect_length, expect_payload, FrameBody};
use crate::frame::{Flags, FrameHeader, FrameType};
use crate::AppResult;

const PING_SIZE: usize = 8;

/// PING frame carrying 8 bytes of opaque data, always on stream 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingFrame {
    pub header: FrameHeader,
    pub opaque_data: [u8; PING_SIZE],
}

impl PingFrame {
    pub fn new(opaque_data: [u8; PING_SIZE]) -> Self {
        PingFrame {
            header: FrameHeader::new(FrameType::Ping, Flags::EMPTY, 0, PING_SIZE as u32),
            opaque_data,
        }
    }

    /// The reply to a ping echoes its data with ACK set.
    pub fn ack(opaque_data: [u8; PING_SIZE]) -> Self {
        PingFrame {
            header: FrameHeader::new(FrameType::Ping, Flags::ACK, 0, PING_SIZE as u32),
            opaque_data,
        }
    }

    pub fn is_ack(&self) -> bool {
        self.header.flags.contains(Flags::ACK)
    }
}

impl FrameBody for PingFrame {
    fn decode(header: FrameHeader, mut payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        expect_length(&header, PING_SIZE as u32)?;
        let mut opaque_data = [0u8; PING_SIZE];
        payload.copy_to_slice(&mut opaque_data);
        Ok(PingFrame {
            header,
            opaque_data,
        })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_slice(&self.opaque_data);
    }

    fn wire_format_size(&self) -> usize {
        PING_SIZE
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }
}
