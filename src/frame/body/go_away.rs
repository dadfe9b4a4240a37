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

use super::{body_length, expect_at_least, expect_payload, FrameBody};
use crate::frame::header::STREAM_ID_MASK;
use crate::frame::{Flags, FrameHeader, FrameType};
use crate::AppResult;

const GO_AWAY_FIXED_SIZE: usize = 8;

/// GOAWAY frame: last processed stream, error code and optional debug data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoAwayFrame {
    pub header: FrameHeader,
    pub last_stream_id: u32,
    pub error_code: u32,
    pub debug_data: Bytes,
}

impl GoAwayFrame {
    pub fn new(last_stream_id: u32, error_code: u32, debug_data: Bytes) -> Self {
        let length = body_length(GO_AWAY_FIXED_SIZE + debug_data.len());
        GoAwayFrame {
            header: FrameHeader::new(FrameType::GoAway, Flags::EMPTY, 0, length),
            last_stream_id: last_stream_id & STREAM_ID_MASK,
            error_code,
            debug_data,
        }
    }
}

impl FrameBody for GoAwayFrame {
    fn decode(header: FrameHeader, mut payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        expect_at_least(&header, GO_AWAY_FIXED_SIZE, payload.len())?;
        let last_stream_id = payload.get_u32() & STREAM_ID_MASK;
        let error_code = payload.get_u32();
        Ok(GoAwayFrame {
            header,
            last_stream_id,
            error_code,
            debug_data: payload,
        })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u32(self.last_stream_id & STREAM_ID_MASK);
        dst.put_u32(self.error_code);
        dst.put_slice(&self.debug_data);
    }

    fn wire_format_size(&self) -> usize {
        GO_AWAY_FIXED_SIZE + self.debug_data.len()
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }
}
