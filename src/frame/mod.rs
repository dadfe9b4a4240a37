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

//! Frame codec.
//!
//! A frame is a 9-byte [`FrameHeader`] followed by exactly `header.length`
//! body bytes whose layout depends on the frame type.
//!
//! # Components
//!
//! - `FrameHeader` / `FrameType` / `Flags`: the common header
//! - `body`: one codec per frame type, all behind [`FrameBody`]
//! - `FrameRegistry`: picks the body codec for a decoded header
//!
//! Here, an enum is used in place of trait objects: `Frame` is closed over
//! the ten known bodies plus `Unknown`, so every dispatch point can match
//! exhaustively.

use bytes::BytesMut;

mod body;
mod flags;
mod header;
mod registry;

pub use body::{
    ContinuationFrame, DataFrame, FrameBody, GoAwayFrame, HeadersFrame, PingFrame, PriorityFrame,
    PrioritySpec, PushPromiseFrame, RstStreamFrame, Setting, SettingsFrame, UnknownFrame,
    WindowUpdateFrame, PRIORITY_SPEC_SIZE,
};
pub use flags::Flags;
pub use header::{FrameHeader, FrameType, FRAME_HEADER_SIZE, MAX_FRAME_LENGTH};
pub use registry::{BodyCodec, FrameRegistry, UnknownFramePolicy};

use crate::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data(DataFrame),
    Headers(HeadersFrame),
    Priority(PriorityFrame),
    RstStream(RstStreamFrame),
    Settings(SettingsFrame),
    PushPromise(PushPromiseFrame),
    Ping(PingFrame),
    GoAway(GoAwayFrame),
    WindowUpdate(WindowUpdateFrame),
    Continuation(ContinuationFrame),
    Unknown(UnknownFrame),
}

///
/// Evaluate `$body => $expr` against whichever body the frame holds.
///
macro_rules! with_body {
    ($frame:expr, $body:ident => $expr:expr) => {
        match $frame {
            Frame::Data($body) => $expr,
            Frame::Headers($body) => $expr,
            Frame::Priority($body) => $expr,
            Frame::RstStream($body) => $expr,
            Frame::Settings($body) => $expr,
            Frame::PushPromise($body) => $expr,
            Frame::Ping($body) => $expr,
            Frame::GoAway($body) => $expr,
            Frame::WindowUpdate($body) => $expr,
            Frame::Continuation($body) => $expr,
            Frame::Unknown($body) => $expr,
        }
    };
}

macro_rules! impl_from_body {
    ($($body:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$body> for Frame {
                fn from(value: $body) -> Self {
                    Frame::$variant(value)
                }
            }
        )*
    };
}

impl_from_body!(
    DataFrame => Data,
    HeadersFrame => Headers,
    PriorityFrame => Priority,
    RstStreamFrame => RstStream,
    SettingsFrame => Settings,
    PushPromiseFrame => PushPromise,
    PingFrame => Ping,
    GoAwayFrame => GoAway,
    WindowUpdateFrame => WindowUpdate,
    ContinuationFrame => Continuation,
    UnknownFrame => Unknown,
);

impl Frame {
    pub fn header(&self) -> &FrameHeader {
        with_body!(self, body => body.header())
    }

    /// Appends the header and body to `dst`.
    ///
    /// Fails without writing anything when the body would not be exactly
    /// `header.length` bytes, or when flags and fields disagree.
    pub fn encode(&self, dst: &mut BytesMut) -> AppResult<()> {
        with_body!(self, body => encode_frame(body, dst))
    }

    /// Total encoded size, header included.
    pub fn wire_format_size(&self) -> usize {
        FRAME_HEADER_SIZE + with_body!(self, body => body.wire_format_size())
    }
}

fn encode_frame<B: FrameBody>(body: &B, dst: &mut BytesMut) -> AppResult<()> {
    body.validate()?;
    let header = body.header();
    let body_size = body.wire_format_size();
    if body_size != header.length as usize {
        return Err(AppError::FrameFormat(format!(
            "{:?} body is {} bytes but header length is {}",
            header.frame_type, body_size, header.length
        )));
    }
    dst.reserve(FRAME_HEADER_SIZE + body_size);
    header.encode(dst)?;
    body.encode_body(dst);
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn test_encode_rejects_length_mismatch() {
        let mut frame = DataFrame::new(1, Bytes::from_static(b"hello"), false);
        frame.header.length = 4;
        let mut buffer = BytesMut::new();
        let result = Frame::from(frame).encode(&mut buffer);
        assert!(matches!(result, Err(AppError::FrameFormat(_))));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_encode_writes_header_then_body() {
        let frame = Frame::from(DataFrame::new(1, Bytes::from_static(b"hello"), true));
        let mut buffer = BytesMut::new();
        frame.encode(&mut buffer).unwrap();
        assert_eq!(buffer.len(), frame.wire_format_size());
        assert_eq!(
            &buffer[..],
            &[0x00, 0x00, 0x05, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, b'h', b'e', b'l', b'l', b'o']
        );
    }
}
