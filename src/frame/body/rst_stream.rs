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

/// RST_STREAM frame, a single 32-bit error code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RstStreamFrame {
    pub header: FrameHeader,
    pub error_code: u32,
}

impl RstStreamFrame {
    pub fn new(stream_id: u32, error_code: u32) -> Self {
        RstStreamFrame {
            header: FrameHeader::new(FrameType::RstStream, Flags::EMPTY, stream_id, 4),
            error_code,
        }
    }
}

impl FrameBody for RstStreamFrame {
    fn decode(header: FrameHeader, mut payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        expect_length(&header, 4)?;
        Ok(RstStreamFrame {
            header,
            error_code: payload.get_u32(),
        })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u32(self.error_code);
    }

    fn wire_format_size(&self) -> usize {
        4
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }
}
