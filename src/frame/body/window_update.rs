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
use crate::frame::header::STREAM_ID_MASK;
use crate::frame::{Flags, FrameHeader, FrameType};
use crate::AppResult;

/// WINDOW_UPDATE frame. The increment is carried as-is, no window is tracked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowUpdateFrame {
    pub header: FrameHeader,
    pub increment: u32,
}

impl WindowUpdateFrame {
    pub fn new(stream_id: u32, increment: u32) -> Self {
        WindowUpdateFrame {
            header: FrameHeader::new(FrameType::WindowUpdate, Flags::EMPTY, stream_id, 4),
            increment: increment & STREAM_ID_MASK,
        }
    }
}

impl FrameBody for WindowUpdateFrame {
    fn decode(header: FrameHeader, mut payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        expect_length(&header, 4)?;
        Ok(WindowUpdateFrame {
            header,
            increment: payload.get_u32() & STREAM_ID_MASK,
        })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u32(self.increment & STREAM_ID_MASK);
    }

    fn wire_format_size(&self) -> usize {
        4
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_bit_is_masked() {
        let header = FrameHeader::new(FrameType::WindowUpdate, Flags::EMPTY, 1, 4);
        let frame =
            WindowUpdateFrame::decode(header, Bytes::from_static(&[0xff, 0xff, 0xff, 0xff])).unwrap();
        assert_eq!(frame.increment, STREAM_ID_MASK);
    }
}
