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
    body_length, check_padding, expect_payload, padded_size, split_padding, FrameBody,
};
use crate::frame::{Flags, FrameHeader, FrameType};
use crate::AppResult;

/// DATA frame.
///
/// ```text
/// +---------------+
/// |Pad Length? (8)|
/// +---------------+-----------------------------------------------+
/// |                            Data (*)                         ...
/// +---------------------------------------------------------------+
/// |                           Padding (*)                       ...
/// +---------------------------------------------------------------+
/// ```
///
/// With PADDED set, `1 + data.len() + pad_length == header.length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    pub header: FrameHeader,
    pub pad_length: u8,
    pub data: Bytes,
    pub padding: Bytes,
}

impl DataFrame {
    pub fn new(stream_id: u32, data: Bytes, end_stream: bool) -> Self {
        let flags = if end_stream {
            Flags::END_STREAM
        } else {
            Flags::EMPTY
        };
        let header = FrameHeader::new(FrameType::Data, flags, stream_id, body_length(data.len()));
        DataFrame {
            header,
            pad_length: 0,
            data,
            padding: Bytes::new(),
        }
    }

    /// Sets PADDED and appends `pad_length` zero bytes of padding.
    pub fn with_padding(mut self, pad_length: u8) -> Self {
        self.header.flags |= Flags::PADDED;
        self.pad_length = pad_length;
        self.padding = Bytes::from(vec![0u8; usize::from(pad_length)]);
        self.header.length = body_length(self.wire_format_size());
        self
    }

    pub fn is_end_stream(&self) -> bool {
        self.header.flags.contains(Flags::END_STREAM)
    }
}

impl FrameBody for DataFrame {
    fn decode(header: FrameHeader, mut payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        let (pad_length, padding) = split_padding(&header, &mut payload)?;
        Ok(DataFrame {
            header,
            pad_length,
            data: payload,
            padding,
        })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        if self.header.is_padded() {
            dst.put_u8(self.pad_length);
        }
        dst.put_slice(&self.data);
        dst.put_slice(&self.padding);
    }

    fn wire_format_size(&self) -> usize {
        padded_size(&self.header, self.data.len(), &self.padding)
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
    use rstest::rstest;

    use super::*;
    use crate::AppError;

    fn data_header(flags: Flags, length: u32) -> FrameHeader {
        FrameHeader::new(FrameType::Data, flags, 1, length)
    }

    #[test]
    fn test_unpadded_body_is_all_data() {
        let frame =
            DataFrame::decode(data_header(Flags::EMPTY, 5), Bytes::from_static(b"hello")).unwrap();
        assert_eq!(frame.data, Bytes::from_static(b"hello"));
        assert!(frame.padding.is_empty());
        assert_eq!(frame.pad_length, 0);
    }

    #[test]
    fn test_padded_body_splits_data_and_padding() {
        let payload = Bytes::from_static(&[0x02, b'a', b'b', b'c', 0x00, 0x00]);
        let frame = DataFrame::decode(data_header(Flags::PADDED, 6), payload).unwrap();
        assert_eq!(frame.pad_length, 2);
        assert_eq!(frame.data, Bytes::from_static(b"abc"));
        assert_eq!(frame.padding, Bytes::from_static(&[0x00, 0x00]));
        assert_eq!(
            1 + frame.data.len() + usize::from(frame.pad_length),
            frame.header.length as usize
        );
    }

    #[test]
    fn test_padding_may_leave_data_empty() {
        let payload = Bytes::from_static(&[0x03, 0x00, 0x00, 0x00]);
        let frame = DataFrame::decode(data_header(Flags::PADDED, 4), payload).unwrap();
        assert!(frame.data.is_empty());
        assert_eq!(frame.padding.len(), 3);
    }

    #[rstest]
    // pad length equal to frame length
    #[case(&[0x04, 0x00, 0x00, 0x00])]
    // pad length larger than frame length
    #[case(&[0xff, b'a'])]
    // no room for the pad length byte itself
    #[case(&[])]
    fn test_padding_overflow_is_rejected(#[case] payload: &'static [u8]) {
        let header = data_header(Flags::PADDED, payload.len() as u32);
        let result = DataFrame::decode(header, Bytes::from_static(payload));
        assert!(matches!(result, Err(AppError::FrameFormat(_))));
    }

    #[test]
    fn test_with_padding_keeps_length_consistent() {
        let frame = DataFrame::new(3, Bytes::from_static(b"abc"), true).with_padding(2);
        assert!(frame.header.is_padded());
        assert!(frame.is_end_stream());
        assert_eq!(frame.header.length, 6);
        assert_eq!(frame.wire_format_size(), 6);
        frame.validate().unwrap();

        let mut buffer = BytesMut::new();
        frame.encode_body(&mut buffer);
        assert_eq!(&buffer[..], &[0x02, b'a', b'b', b'c', 0x00, 0x00]);
    }

    #[test]
    fn test_mismatched_padding_fails_validation() {
        let mut frame = DataFrame::new(3, Bytes::from_static(b"abc"), false).with_padding(2);
        frame.padding = Bytes::from_static(&[0x00]);
        assert!(frame.validate().is_err());

        let mut unpadded = DataFrame::new(3, Bytes::from_static(b"abc"), false);
        unpadded.padding = Bytes::from_static(&[0x00]);
        assert!(unpadded.validate().is_err());
    }
}
