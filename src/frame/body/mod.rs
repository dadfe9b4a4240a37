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

//! Frame body codecs, one per frame type.
//!
//! Every codec works on a payload that was split off the read buffer at
//! exactly `header.length` bytes, so a body can never read into the next
//! frame. Fixed-size bodies reject any other length, variable-size bodies
//! take whatever is left after their fixed fields.

use bytes::{Buf, Bytes, BytesMut};

use super::FrameHeader;
use crate::{AppError, AppResult};

mod continuation;
mod data;
mod go_away;
mod headers;
mod ping;
mod priority;
mod push_promise;
mod rst_stream;
mod settings;
mod unknown;
mod window_update;

pub use continuation::ContinuationFrame;
pub use data::DataFrame;
pub use go_away::GoAwayFrame;
pub use headers::HeadersFrame;
pub use ping::PingFrame;
pub use priority::{PriorityFrame, PrioritySpec, PRIORITY_SPEC_SIZE};
pub use push_promise::PushPromiseFrame;
pub use rst_stream::RstStreamFrame;
pub use settings::{Setting, SettingsFrame};
pub use unknown::UnknownFrame;
pub use window_update::WindowUpdateFrame;

/// Codec contract shared by all frame bodies.
///
/// Each body owns the header it was decoded with. `wire_format_size` must
/// equal the number of bytes `encode_body` appends; the frame encoder refuses
/// to write a body whose size disagrees with `header.length`.
pub trait FrameBody: Sized {
    fn decode(header: FrameHeader, payload: Bytes) -> AppResult<Self>;

    fn encode_body(&self, dst: &mut BytesMut);

    fn wire_format_size(&self) -> usize;

    fn header(&self) -> &FrameHeader;

    /// Checks field combinations the header flags constrain.
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Body length as it goes into a header. Anything too long for `u32` is
/// caught later because it can never match the encoded size.
pub(crate) fn body_length(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Reads the pad length byte of a PADDED body and cuts the trailing padding off
/// `payload`, leaving only the fields in between.
pub(crate) fn split_padding(header: &FrameHeader, payload: &mut Bytes) -> AppResult<(u8, Bytes)> {
    if !header.is_padded() {
        return Ok((0, Bytes::new()));
    }
    if !payload.has_remaining() {
        return Err(AppError::FrameFormat(format!(
            "padded {:?} frame has no pad length byte",
            header.frame_type
        )));
    }
    let pad_length = payload.get_u8();
    if usize::from(pad_length) > payload.remaining() {
        return Err(AppError::FrameFormat(format!(
            "pad length {} must be less than frame length {}",
            pad_length, header.length
        )));
    }
    let padding = payload.split_off(payload.len() - usize::from(pad_length));
    Ok((pad_length, padding))
}

/// First check of every body decoder: the payload is exactly the body the
/// header announces, no more and no less.
pub(crate) fn expect_payload(header: &FrameHeader, payload: &Bytes) -> AppResult<()> {
    if payload.len() != header.length as usize {
        return Err(AppError::FrameFormat(format!(
            "{:?} header length {} but {} body bytes",
            header.frame_type,
            header.length,
            payload.len()
        )));
    }
    Ok(())
}

pub(crate) fn check_padding(header: &FrameHeader, pad_length: u8, padding: &Bytes) -> AppResult<()> {
    if header.is_padded() {
        if usize::from(pad_length) != padding.len() {
            return Err(AppError::FrameFormat(format!(
                "pad length {} but {} padding bytes",
                pad_length,
                padding.len()
            )));
        }
    } else if pad_length != 0 || !padding.is_empty() {
        return Err(AppError::FrameFormat(format!(
            "{:?} frame carries padding without the PADDED flag",
            header.frame_type
        )));
    }
    Ok(())
}

pub(crate) fn padded_size(header: &FrameHeader, inner: usize, padding: &Bytes) -> usize {
    if header.is_padded() {
        1 + inner + padding.len()
    } else {
        inner
    }
}

pub(crate) fn expect_length(header: &FrameHeader, expected: u32) -> AppResult<()> {
    if header.length != expected {
        return Err(AppError::FrameFormat(format!(
            "{:?} frame length must be {}, got {}",
            header.frame_type, expected, header.length
        )));
    }
    Ok(())
}

pub(crate) fn expect_at_least(header: &FrameHeader, minimum: usize, available: usize) -> AppResult<()> {
    if available < minimum {
        return Err(AppError::FrameFormat(format!(
            "{:?} frame needs at least {} bytes, {} left of length {}",
            header.frame_type, minimum, available, header.length
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::frame::{Flags, FrameRegistry, FrameType};

    #[rstest]
    // fixed-size bodies handed fewer bytes than their header announces
    #[case(FrameType::RstStream, 4, &[0x00, 0x01])]
    #[case(FrameType::Ping, 8, &[0x00, 0x01, 0x02])]
    #[case(FrameType::Priority, 5, &[0x00, 0x00])]
    #[case(FrameType::WindowUpdate, 4, &[0x01])]
    #[case(FrameType::GoAway, 8, &[0x00, 0x00, 0x00, 0x01])]
    // and more bytes than announced
    #[case(FrameType::RstStream, 4, &[0x00, 0x00, 0x00, 0x01, 0x02])]
    #[case(FrameType::Ping, 8, &[0u8; 9])]
    // variable-size bodies with a mismatch either way
    #[case(FrameType::Data, 10, b"hello")]
    #[case(FrameType::Headers, 1, b"hd")]
    #[case(FrameType::Settings, 0, &[0x00, 0x01, 0x00, 0x00, 0x10, 0x00])]
    #[case(FrameType::PushPromise, 6, &[0x00, 0x00, 0x00, 0x02])]
    #[case(FrameType::Continuation, 3, b"abcd")]
    fn test_body_decoder_rejects_length_mismatch(
        #[case] frame_type: FrameType,
        #[case] length: u32,
        #[case] payload: &'static [u8],
    ) {
        let codec = FrameRegistry::default().codec_for(frame_type).unwrap();
        let header = FrameHeader::new(frame_type, Flags::EMPTY, 1, length);
        let result = codec(header, Bytes::from_static(payload));
        assert!(matches!(result, Err(AppError::FrameFormat(_))));
    }

    #[test]
    fn test_unknown_body_rejects_length_mismatch() {
        let header = FrameHeader::new(FrameType::Unknown(0x0c), Flags::EMPTY, 1, 2);
        let result = UnknownFrame::decode(header, Bytes::from_static(b"abc"));
        assert!(matches!(result, Err(AppError::FrameFormat(_))));
    }
}
