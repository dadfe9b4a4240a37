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

use bytes::{Buf, Bytes, BytesMut};

use crate::frame::{FrameHeader, FRAME_HEADER_SIZE};
use crate::{AppError, AppResult};

/// A header plus its body bytes, cut off the read buffer but not yet decoded.
#[derive(Debug)]
pub struct RawFrame {
    pub header: FrameHeader,
    pub payload: Bytes,
}

impl RawFrame {
    /// Checks that a whole frame is buffered and returns its header.
    ///
    /// `Incomplete` means more bytes are needed; room for the rest of the
    /// frame is reserved so the next read can fill it.
    pub fn check(buffer: &mut BytesMut, max_frame_size: u32) -> AppResult<FrameHeader> {
        let header = FrameHeader::decode(&buffer[..])?;
        if header.length > max_frame_size {
            return Err(AppError::FrameFormat(format!(
                "Frame of length {} is too large, limit is {}.",
                header.length, max_frame_size
            )));
        }
        let frame_size = FRAME_HEADER_SIZE + header.length as usize;
        if buffer.remaining() < frame_size {
            buffer.reserve(frame_size - buffer.remaining());
            return Err(AppError::Incomplete);
        }
        Ok(header)
    }

    pub(crate) fn parse(buffer: &mut BytesMut, max_frame_size: u32) -> AppResult<Option<RawFrame>> {
        // perform a check to ensure we have enough data
        match RawFrame::check(buffer, max_frame_size) {
            Ok(header) => {
                buffer.advance(FRAME_HEADER_SIZE);
                let payload = buffer.split_to(header.length as usize).freeze();
                Ok(Some(RawFrame { header, payload }))
            }
            Err(AppError::Incomplete) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Flags, FrameType};

    #[test]
    fn test_waits_for_whole_frame() {
        let mut buffer = BytesMut::from(&[0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, b'h'][..]);
        assert!(RawFrame::parse(&mut buffer, 16384).unwrap().is_none());
        assert_eq!(buffer.len(), 10);

        buffer.extend_from_slice(b"ello");
        let raw = RawFrame::parse(&mut buffer, 16384).unwrap().unwrap();
        assert_eq!(raw.header, FrameHeader::new(FrameType::Data, Flags::EMPTY, 1, 5));
        assert_eq!(raw.payload, Bytes::from_static(b"hello"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_header_is_not_an_error() {
        let mut buffer = BytesMut::from(&[0x00, 0x00, 0x05, 0x00][..]);
        assert!(RawFrame::parse(&mut buffer, 16384).unwrap().is_none());
    }

    #[test]
    fn test_oversized_frame_is_rejected_before_body_arrives() {
        let mut buffer = BytesMut::from(&[0x00, 0x40, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01][..]);
        let result = RawFrame::parse(&mut buffer, 16384);
        assert!(matches!(result, Err(AppError::FrameFormat(_))));
    }

    #[test]
    fn test_leaves_next_frame_in_buffer() {
        let mut buffer = BytesMut::new();
        buffer.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, b'a']);
        buffer.extend_from_slice(&[0x00, 0x00, 0x00, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00]);
        let first = RawFrame::parse(&mut buffer, 16384).unwrap().unwrap();
        assert_eq!(first.payload, Bytes::from_static(b"a"));
        let second = RawFrame::parse(&mut buffer, 16384).unwrap().unwrap();
        assert_eq!(second.header.frame_type, FrameType::Settings);
        assert!(second.payload.is_empty());
    }
}
