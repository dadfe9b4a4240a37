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

use super::{expect_payload, FrameBody};
use crate::frame::FrameHeader;
use crate::AppResult;

/// Body of a frame whose type byte is not one of the known types.
///
/// The payload is only held so that the frame can be logged or forwarded;
/// nothing interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFrame {
    pub header: FrameHeader,
    pub payload: Bytes,
}

impl FrameBody for UnknownFrame {
    fn decode(header: FrameHeader, payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        Ok(UnknownFrame { header, payload })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_slice(&self.payload);
    }

    fn wire_format_size(&self) -> usize {
        self.payload.len()
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }
}
