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

use bytes::{BufMut, Bytes, BytesMut};

use super::{
    body_length, check_padding, expect_at_least, expect_payload, padded_size, split_padding,
    FrameBody, PrioritySpec, PRIORITY_SPEC_SIZE,
};
use crate::frame::{Flags, FrameHeader, FrameType};
use crate::{AppError, AppResult};

/// HEADERS frame.
///
/// ```text
/// +---------------+
/// |Pad Length? (8)|
/// +-+-------------+-----------------------------------------------+
/// |E|                 Stream Dependency? (31)                     |
/// +-+-------------+-----------------------------------------------+
/// |  Weight? (8)  |
/// +-+-------------+-----------------------------------------------+
/// |                   Header Block Fragment (*)                 ...
/// +---------------------------------------------------------------+
/// |                           Padding (*)                       ...
/// +---------------------------------------------------------------+
/// ```
///
/// The fragment is kept as opaque bytes, nothing here decompresses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadersFrame {
    pub header: FrameHeader,
    pub pad_length: u8,
    pub priority: Option<PrioritySpec>,
    pub fragment: Bytes,
    pub padding: Bytes,
}

impl HeadersFrame {
    pub fn new(stream_id: u32, fragment: Bytes, mut flags: Flags) -> Self {
        flags.remove(Flags::PADDED);
        flags.remove(Flags::PRIORITY);
        let header = FrameHeader::new(
            FrameType::Headers,
            flags,
            stream_id,
            body_length(fragment.len()),
        );
        HeadersFrame {
            header,
            pad_length: 0,
            priority: None,
            fragment,
            padding: Bytes::new(),
        }
    }

    pub fn with_priority(mut self, priority: PrioritySpec) -> Self {
        self.header.flags |= Flags::PRIORITY;
        self.priority = Some(priority);
        self.header.length = body_length(self.wire_format_size());
        self
    }

    pub fn with_padding(mut self, pad_length: u8) -> Self {
        self.header.flags |= Flags::PADDED;
        self.pad_length = pad_length;
        self.padding = Bytes::from(vec![0u8; usize::from(pad_length)]);
        self.header.length = body_length(self.wire_format_size());
        self
    }
}

impl FrameBody for HeadersFrame {
    fn decode(header: FrameHeader, mut payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        let (pad_length, padding) = split_padding(&header, &mut payload)?;
        let priority = if header.flags.contains(Flags::PRIORITY) {
            expect_at_least(&header, PRIORITY_SPEC_SIZE, payload.len())?;
            Some(PrioritySpec::decode(&mut payload))
        } else {
            None
        };
        Ok(HeadersFrame {
            header,
            pad_length,
            priority,
            fragment: payload,
            padding,
        })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        if self.header.is_padded() {
            dst.put_u8(self.pad_length);
        }
        if let Some(priority) = &self.priority {
            priority.encode(dst);
        }
        dst.put_slice(&self.fragment);
        dst.put_slice(&self.padding);
    }

    fn wire_format_size(&self) -> usize {
        let priority_size = self.priority.map_or(0, |_| PRIORITY_SPEC_SIZE);
        padded_size(&self.header, priority_size + self.fragment.len(), &self.padding)
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }

    fn validate(&self) -> AppResult<()> {
        check_padding(&self.header, self.pad_length, &self.padding)?;
        if self.header.flags.contains(Flags::PRIORITY) != self.priority.is_some() {
            return Err(AppError::FrameFormat(
                "PRIORITY flag and priority fields disagree".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_with_priority() {
        let flags = Flags::PADDED | Flags::PRIORITY | Flags::END_HEADERS;
        // pad length, exclusive dependency on stream 1, weight 7, fragment "hd", one pad byte
        let payload = Bytes::from_static(&[0x01, 0x80, 0x00, 0x00, 0x01, 0x07, b'h', b'd', 0x00]);
        let header = FrameHeader::new(FrameType::Headers, flags, 3, payload.len() as u32);
        let frame = HeadersFrame::decode(header, payload.clone()).unwrap();

        assert_eq!(frame.pad_length, 1);
        assert_eq!(frame.fragment, Bytes::from_static(b"hd"));
        assert_eq!(frame.padding.len(), 1);
        let priority = frame.priority.unwrap();
        assert!(priority.exclusive);
        assert_eq!(priority.dependency, 1);
        assert_eq!(priority.weight, 7);

        let mut buffer = BytesMut::new();
        frame.encode_body(&mut buffer);
        assert_eq!(buffer.freeze(), payload);
    }

    #[test]
    fn test_priority_flag_without_room_is_rejected() {
        let header = FrameHeader::new(FrameType::Headers, Flags::PRIORITY, 3, 3);
        let result = HeadersFrame::decode(header, Bytes::from_static(&[0x00, 0x00, 0x01]));
        assert!(matches!(result, Err(AppError::FrameFormat(_))));
    }

    #[test]
    fn test_builder_computes_length() {
        let frame = HeadersFrame::new(1, Bytes::from_static(b"abcd"), Flags::END_HEADERS)
            .with_priority(PrioritySpec {
                exclusive: false,
                dependency: 0,
                weight: 16,
            })
            .with_padding(3);
        assert_eq!(frame.header.length, 1 + 5 + 4 + 3);
        assert_eq!(frame.wire_format_size(), frame.header.length as usize);
        frame.validate().unwrap();
    }
}
