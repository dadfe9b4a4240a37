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

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// The 8-bit flags field of a frame header.
///
/// Bit meaning depends on the frame type. Bits this crate does not know about
/// are kept as they were read, so a decoded header re-encodes to the same byte.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    pub const EMPTY: Flags = Flags(0);
    /// DATA and HEADERS: last frame the peer sends on this stream.
    pub const END_STREAM: Flags = Flags(0x01);
    /// SETTINGS and PING: the frame acknowledges a previous one. Shares bit 0x01.
    pub const ACK: Flags = Flags(0x01);
    pub const END_HEADERS: Flags = Flags(0x04);
    pub const PADDED: Flags = Flags(0x08);
    pub const PRIORITY: Flags = Flags(0x20);

    pub const fn from_bits(bits: u8) -> Self {
        Flags(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn remove(&mut self, other: Flags) {
        self.0 &= !other.0;
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flags({:#04x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_and_remove() {
        let mut flags = Flags::END_STREAM | Flags::PADDED;
        assert!(flags.contains(Flags::PADDED));
        assert!(flags.contains(Flags::END_STREAM));
        assert!(!flags.contains(Flags::PRIORITY));
        assert!(Flags::EMPTY.is_empty());

        flags.remove(Flags::PADDED);
        assert_eq!(flags, Flags::END_STREAM);
        assert_eq!(flags.bits(), 0x01);
    }

    #[test]
    fn test_unknown_bits_survive() {
        let flags = Flags::from_bits(0xc2);
        assert_eq!(flags.bits(), 0xc2);
        assert!(!flags.contains(Flags::PADDED));
    }
}
