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

use super::{body_length, expect_payload, FrameBody};
use crate::frame::{Flags, FrameHeader, FrameType};
use crate::AppResult;

/// CONTINUATION frame, the rest of a header block fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationFrame {
    pub header: FrameHeader,
    pub fragment: Bytes,
}

impl ContinuationFrame {
    pub fn new(stream_id: u32, fragment: Bytes, end_headers: bool) -> Self {
        let flags = if end_headers {
            Flags::END_HEADERS
        } else {
            Flags::EMPTY
        };
        ContinuationFrame {
            header: FrameHeader::new(
                FrameType::Continuation,
                flags,
                stream_id,
                body_length(fragment.len()),
            ),
            fragment,
        }
    }
}

impl FrameBody for ContinuationFrame {
    fn decode(header: FrameHeader, payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        Ok(ContinuationFrame {
            header,
            fragment: payload,
        })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_slice(&self.fragment);
    }

    fn wire_format_size(&self) -> usize {
        self.fragment.len()
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }
}
