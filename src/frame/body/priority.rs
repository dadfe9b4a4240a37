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

pub const PRIORITY_SPEC_SIZE: usize = 5;

/// Stream dependency block used by PRIORITY and by HEADERS with the PRIORITY flag.
///
/// ```text
/// +-+-------------------------------------------------------------+
/// |E|                  Stream Dependency (31)                     |
/// +-+-------------+-----------------------------------------------+
/// |   Weight (8)  |
/// +-+-------------+
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrioritySpec {
    pub exclusive: bool,
    pub dependency: u32,
    pub weight: u8,
}

impl PrioritySpec {
    /// Caller guarantees `PRIORITY_SPEC_SIZE` bytes remain.
    pub(crate) fn decode(src: &mut Bytes) -> Self {
        let raw = src.get_u32();
        let weight = src.get_u8();
        PrioritySpec {
            exclusive: raw & !STREAM_ID_MASK != 0,
            dependency: raw & STREAM_ID_MASK,
            weight,
        }
    }

    pub(crate) fn encode(&self, dst: &mut BytesMut) {
        let exclusive = if self.exclusive { !STREAM_ID_MASK } else { 0 };
        dst.put_u32(exclusive | (self.dependency & STREAM_ID_MASK));
        dst.put_u8(self.weight);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityFrame {
    pub header: FrameHeader,
    pub priority: PrioritySpec,
}

impl PriorityFrame {
    pub fn new(stream_id: u32, priority: PrioritySpec) -> Self {
        PriorityFrame {
            header: FrameHeader::new(
                FrameType::Priority,
                Flags::EMPTY,
                stream_id,
                PRIORITY_SPEC_SIZE as u32,
            ),
            priority,
        }
    }
}

impl FrameBody for PriorityFrame {
    fn decode(header: FrameHeader, mut payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        expect_length(&header, PRIORITY_SPEC_SIZE as u32)?;
        let priority = PrioritySpec::decode(&mut payload);
        Ok(PriorityFrame { header, priority })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        self.priority.encode(dst);
    }

    fn wire_format_size(&self) -> usize {
        PRIORITY_SPEC_SIZE
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_bit_is_split_from_dependency() {
        let header = FrameHeader::new(FrameType::Priority, Flags::EMPTY, 5, 5);
        let payload = Bytes::from_static(&[0x80, 0x00, 0x00, 0x03, 0x0f]);
        let frame = PriorityFrame::decode(header, payload).unwrap();
        assert_eq!(
            frame.priority,
            PrioritySpec {
                exclusive: true,
                dependency: 3,
                weight: 15,
            }
        );

        let mut buffer = BytesMut::new();
        frame.encode_body(&mut buffer);
        assert_eq!(&buffer[..], &[0x80, 0x00, 0x00, 0x03, 0x0f]);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let header = FrameHeader::new(FrameType::Priority, Flags::EMPTY, 5, 4);
        let payload = Bytes::from_static(&[0x00, 0x00, 0x00, 0x03]);
        assert!(PriorityFrame::decode(header, payload).is_err());
    }
}
