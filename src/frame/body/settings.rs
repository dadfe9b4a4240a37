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

use super::{body_length, expect_payload, FrameBody};
use crate::frame::{Flags, FrameHeader, FrameType};
use crate::{AppError, AppResult};

const SETTING_SIZE: usize = 6;

/// One identifier/value pair. Identifiers are kept raw, unknown ones included.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Setting {
    pub identifier: u16,
    pub value: u32,
}

/// SETTINGS frame: zero or more 6-byte settings. An ACK carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFrame {
    pub header: FrameHeader,
    pub settings: Vec<Setting>,
}

impl SettingsFrame {
    pub fn new(settings: Vec<Setting>) -> Self {
        let length = body_length(settings.len() * SETTING_SIZE);
        SettingsFrame {
            header: FrameHeader::new(FrameType::Settings, Flags::EMPTY, 0, length),
            settings,
        }
    }

    pub fn ack() -> Self {
        SettingsFrame {
            header: FrameHeader::new(FrameType::Settings, Flags::ACK, 0, 0),
            settings: Vec::new(),
        }
    }

    pub fn is_ack(&self) -> bool {
        self.header.flags.contains(Flags::ACK)
    }
}

impl FrameBody for SettingsFrame {
    fn decode(header: FrameHeader, mut payload: Bytes) -> AppResult<Self> {
        expect_payload(&header, &payload)?;
        if header.flags.contains(Flags::ACK) && header.length != 0 {
            return Err(AppError::FrameFormat(format!(
                "settings ack must be empty, length is {}",
                header.length
            )));
        }
        if payload.len() % SETTING_SIZE != 0 {
            return Err(AppError::FrameFormat(format!(
                "settings length {} is not a multiple of {}",
                header.length, SETTING_SIZE
            )));
        }
        let mut settings = Vec::with_capacity(payload.len() / SETTING_SIZE);
        while payload.has_remaining() {
            settings.push(Setting {
                identifier: payload.get_u16(),
                value: payload.get_u32(),
            });
        }
        Ok(SettingsFrame { header, settings })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        for setting in &self.settings {
            dst.put_u16(setting.identifier);
            dst.put_u32(setting.value);
        }
    }

    fn wire_format_size(&self) -> usize {
        self.settings.len() * SETTING_SIZE
    }

    fn header(&self) -> &FrameHeader {
        &self.header
    }

    fn validate(&self) -> AppResult<()> {
        if self.is_ack() && !self.settings.is_empty() {
            return Err(AppError::FrameFormat(
                "settings ack must not carry settings".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_decode_pairs() {
        let payload = Bytes::from_static(&[
            0x00, 0x03, 0x00, 0x00, 0x00, 0x64, // max concurrent streams = 100
            0x00, 0x04, 0x00, 0x01, 0x00, 0x00, // initial window size = 65536
        ]);
        let header = FrameHeader::new(FrameType::Settings, Flags::EMPTY, 0, 12);
        let frame = SettingsFrame::decode(header, payload).unwrap();
        assert_eq!(
            frame.settings,
            vec![
                Setting { identifier: 3, value: 100 },
                Setting { identifier: 4, value: 65536 },
            ]
        );
        assert_eq!(frame.wire_format_size(), 12);
    }

    #[rstest]
    #[case(Flags::EMPTY, &[0x00, 0x03, 0x00, 0x00, 0x00])]
    #[case(Flags::ACK, &[0x00, 0x03, 0x00, 0x00, 0x00, 0x64])]
    fn test_malformed_settings(#[case] flags: Flags, #[case] payload: &'static [u8]) {
        let header = FrameHeader::new(FrameType::Settings, flags, 0, payload.len() as u32);
        assert!(SettingsFrame::decode(header, Bytes::from_static(payload)).is_err());
    }

    #[test]
    fn test_ack_is_empty() {
        let ack = SettingsFrame::ack();
        assert!(ack.is_ack());
        assert_eq!(ack.header.length, 0);
        ack.validate().unwrap();
    }
}
