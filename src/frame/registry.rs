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

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{
    ContinuationFrame, DataFrame, Frame, FrameBody, FrameHeader, FrameType, GoAwayFrame,
    HeadersFrame, PingFrame, PriorityFrame, PushPromiseFrame, RstStreamFrame, SettingsFrame,
    UnknownFrame, WindowUpdateFrame,
};
use crate::{AppError, AppResult};

/// Decodes a body of exactly `header.length` bytes into a frame.
pub type BodyCodec = fn(FrameHeader, Bytes) -> AppResult<Frame>;

/// What to do with a frame whose type has no registered codec.
///
/// Either way the body bytes have already been taken off the read buffer, so
/// the next frame starts where it should.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFramePolicy {
    /// discard the body and keep reading frames
    #[default]
    Skip,
    /// fail the connection
    Reject,
}

fn decode_into<B>(header: FrameHeader, payload: Bytes) -> AppResult<Frame>
where
    B: FrameBody + Into<Frame>,
{
    B::decode(header, payload).map(Into::into)
}

/// Maps a frame type to its body codec.
#[derive(Debug, Copy, Clone, Default)]
pub struct FrameRegistry {
    unknown_frame_policy: UnknownFramePolicy,
}

impl FrameRegistry {
    pub fn new(unknown_frame_policy: UnknownFramePolicy) -> Self {
        FrameRegistry {
            unknown_frame_policy,
        }
    }

    pub fn unknown_frame_policy(&self) -> UnknownFramePolicy {
        self.unknown_frame_policy
    }

    pub fn codec_for(&self, frame_type: FrameType) -> Option<BodyCodec> {
        let codec: BodyCodec = match frame_type {
            FrameType::Data => decode_into::<DataFrame>,
            FrameType::Headers => decode_into::<HeadersFrame>,
            FrameType::Priority => decode_into::<PriorityFrame>,
            FrameType::RstStream => decode_into::<RstStreamFrame>,
            FrameType::Settings => decode_into::<SettingsFrame>,
            FrameType::PushPromise => decode_into::<PushPromiseFrame>,
            FrameType::Ping => decode_into::<PingFrame>,
            FrameType::GoAway => decode_into::<GoAwayFrame>,
            FrameType::WindowUpdate => decode_into::<WindowUpdateFrame>,
            FrameType::Continuation => decode_into::<ContinuationFrame>,
            FrameType::Unknown(_) => return None,
        };
        Some(codec)
    }

    /// Decodes one frame body. Every codec fails unless `payload` holds
    /// exactly `header.length` bytes.
    pub fn decode(&self, header: FrameHeader, payload: Bytes) -> AppResult<Frame> {
        match self.codec_for(header.frame_type) {
            Some(codec) => codec(header, payload),
            None => match self.unknown_frame_policy {
                UnknownFramePolicy::Skip => decode_into::<UnknownFrame>(header, payload),
                UnknownFramePolicy::Reject => Err(AppError::FrameFormat(format!(
                    "unsupported frame type {:#04x}",
                    u8::from(header.frame_type)
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::frame::Flags;

    #[test]
    fn test_every_known_type_has_a_codec() {
        let registry = FrameRegistry::default();
        for byte in 0u8..=0x9 {
            assert!(registry.codec_for(FrameType::from(byte)).is_some());
        }
        assert!(registry.codec_for(FrameType::Unknown(0x0a)).is_none());
    }

    #[rstest]
    #[case(UnknownFramePolicy::Skip, true)]
    #[case(UnknownFramePolicy::Reject, false)]
    fn test_unknown_type_follows_policy(#[case] policy: UnknownFramePolicy, #[case] ok: bool) {
        let registry = FrameRegistry::new(policy);
        let header = FrameHeader::new(FrameType::Unknown(0xbb), Flags::EMPTY, 1, 3);
        let result = registry.decode(header, Bytes::from_static(b"abc"));
        assert_eq!(result.is_ok(), ok);
        if let Ok(frame) = result {
            assert!(matches!(frame, Frame::Unknown(ref body) if body.payload.len() == 3));
        }
    }

    #[test]
    fn test_payload_must_match_length() {
        let registry = FrameRegistry::default();
        let header = FrameHeader::new(FrameType::Data, Flags::EMPTY, 1, 5);
        let result = registry.decode(header, Bytes::from_static(b"hell"));
        assert!(matches!(result, Err(AppError::FrameFormat(_))));
    }

    #[test]
    fn test_dispatches_to_matching_body() {
        let registry = FrameRegistry::default();
        let header = FrameHeader::new(FrameType::WindowUpdate, Flags::EMPTY, 3, 4);
        let frame = registry
            .decode(header, Bytes::from_static(&[0x00, 0x00, 0x10, 0x00]))
            .unwrap();
        assert_eq!(frame, Frame::from(WindowUpdateFrame::new(3, 4096)));
    }
}
