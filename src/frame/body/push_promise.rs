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

use super::{
    body_length, check_padding, expect_at_least, expect_payload, padded_size, split_padding,
    FrameBody,
};
use crate::frame::header::STREAM_ID_MASK;
use crate::frame::{Flags, FrameHeader, FrameType};
use crate::AppResult;

const PROMISED_STREAM_ID_SIZE: usize = 4;

/// PUSH_PROMISE frame.
///
/// ```text
/// +---------------+
/// |Pad Length? (8)|
/// +-+-------------+-----------------------------------------------+
/// |R|                  Promised Stream ID (31)                    |
/// +-+-----------------------------+-------------------------------+
/// |                   Header Block Fragment (*)                 ...
/// +---------------------------------------------------------------+
/// |                           Padding (*)                       ...
/// +---------------------------------------------------------------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPromiseFrame {
    pub header: FrameHeader,
    pub pad_length: u8,
    pub promised_stream_id: u32,
    pub fragment: Bytes,
    pub padding: Bytes,
}

impl PushPromiseFrame {
    pub fn new(stream_id: u32, promised_stream_id: u32, fragment: Bytes, end_headers: bool) -> Self {
        let flags = if end_headers {
            Flags::END_HEADERS
        } else {
            Flags::EMPTY
        };
        let length = body_length(PROMISED_STREAM_ID_SIZE + fragment.len());
        PushPromiseFrame {
            header: FrameHeader::new(FrameType::PushPromise, flags, stream_id, length),
            pad_length: 0,
            promised_stream_id: promised_stream_id & STREAM_ID_MASK,
            fragment,
            padding: Bytes::new(),
        }
    }
}

impl FrameBody for PushPromiseFrame {
    fn decode(header: FrameHeader, mut payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        let (pad_length, padding) = split_padding(&header, &mut payload)?;
        expect_at_least(&header, PROMISED_STREAM_ID_SIZE, payload.len())?;
        let promised_stream_id = payload.get_u32() & STREAM_ID_MASK;
        Ok(PushPromiseFrame {
            header,
            pad_length,
            promised_stream_id,
            fragment: payload,
            padding,
        })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        if self.header.is_padded() {
            dst.put_u8(self.pad_length);
        }
        dst.put_u32(self.promised_stream_id & STREAM_ID_MASK);
        dst.put_slice(&self.fragment);
        dst.put_slice(&self.padding);
    }

    fn wire_format_size(&self) -> usize {
        padded_size(
            &self.header,
            PROMISED_STREAM_ID_SIZE + self.fragment.len(),
            &self.padding,
        )
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }

    fn validate(&self) -> AppResult<()> {
        check_padding(&self.header, self.pad_length, &self.padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_promise_masks_reserved_bit() {
        let payload = Bytes::from_static(&[0x02, 0x80, 0x00, 0x00, 0x04, b'x', 0x00, 0x00]);
        let header = FrameHeader::new(FrameType::PushPromise, Flags::PADDED, 1, 8);
        let frame = PushPromiseFrame::decode(header, payload).unwrap();
        assert_eq!(frame.promised_stream_id, 4);
        assert_eq!(frame.fragment, Bytes::from_static(b"x"));
        assert_eq!(frame.padding.len(), 2);

        let mut buffer = BytesMut::new();
        frame.encode_body(&mut buffer);
        assert_eq!(&buffer[..], &[0x02, 0x00, 0x00, 0x00, 0x04, b'x', 0x00, 0x00]);
    }

    #[test]
    fn test_missing_promised_stream_id() {
        let header = FrameHeader::new(FrameType::PushPromise, Flags::EMPTY, 1, 3);
        assert!(PushPromiseFrame::decode(header, Bytes::from_static(&[0, 0, 1])).is_err());
    }
}
