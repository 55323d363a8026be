// Copyright (c) 2023 Huawei Device Co., Ltd.
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

//! [Integer Representation] implementation of [HPACK].
//!
//! [Integer Representation]: https://httpwg.org/specs/rfc7541.html#integer.representation
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! Integers are used to represent name indexes, header field indexes, or
//! string lengths. An integer representation can start anywhere within an
//! octet. To allow for optimized processing, an integer representation always
//! finishes at the end of an octet.

use core::cmp::Ordering;

use crate::error::{ErrorKind, HpackError};

/// Decoded integers must stay below 2^31; anything larger is treated as a
/// malformed integer.
const INTEGER_LIMIT: usize = 1 << 31;

/// `IntegerDecoder` implementation according to `Pseudocode to decode an
/// integer I` in `RFC7541 section-5.1`.
///
/// # Pseudocode
/// ```text
/// decode I from the next N bits
/// if I < 2^N - 1, return I
/// else
///     M = 0
///     repeat
///         B = next octet
///         I = I + (B & 127) * 2^M
///         M = M + 7
///     while B & 128 == 128
///     return I
/// ```
pub(crate) struct IntegerDecoder {
    value: usize,
    shift: u32,
}

impl IntegerDecoder {
    /// Calculates an integer based on the incoming first byte and mask.
    /// If no continuation bytes follow, returns the result directly,
    /// otherwise returns the decoder itself.
    pub(crate) fn first_byte(byte: u8, mask: u8) -> Result<usize, Self> {
        let value = byte & mask;
        match value.cmp(&mask) {
            Ordering::Less => Ok(value as usize),
            _ => Err(Self {
                value: value as usize,
                shift: 0,
            }),
        }
    }

    /// Continues computing the integer based on the next byte of the input.
    /// Returns `Ok(Some(value))` if the result is complete, `Ok(None)` if
    /// more continuation bytes follow, and `Err` if the value reaches 2^31.
    ///
    /// The continuation condition is "high bit set"; the `0x80` test below
    /// carries that meaning, it is not a representation flag.
    pub(crate) fn next_byte(&mut self, byte: u8) -> Result<Option<usize>, HpackError> {
        self.value = 1usize
            .checked_shl(self.shift)
            .and_then(|pow| pow.checked_mul((byte & 0x7f) as usize))
            .and_then(|add| add.checked_add(self.value))
            .filter(|value| *value < INTEGER_LIMIT)
            .ok_or(HpackError::from(ErrorKind::MalformedInteger))?;
        self.shift += 7;
        match (byte & 0x80) == 0x00 {
            true => Ok(Some(self.value)),
            false => Ok(None),
        }
    }
}

/// Appends an integer to `dst` according to `Pseudocode to represent an
/// integer I` in `RFC7541 section-5.1`. `pre` holds the representation flag
/// bits above the `mask`-wide prefix.
///
/// # Pseudocode
/// ```text
/// if I < 2^N - 1, encode I on N bits
/// else
///     encode (2^N - 1) on N bits
///     I = I - (2^N - 1)
///     while I >= 128
///          encode (I % 128 + 128) on 8 bits
///          I = I / 128
///     encode I on 8 bits
/// ```
pub(crate) fn write_integer(value: usize, mask: u8, pre: u8, dst: &mut Vec<u8>) {
    if value < mask as usize {
        dst.push(pre | (value as u8));
        return;
    }
    dst.push(pre | mask);
    let mut value = value - mask as usize;
    while value >= 128 {
        dst.push(((value & 0x7f) as u8) | 0x80);
        value >>= 7;
    }
    dst.push(value as u8);
}
