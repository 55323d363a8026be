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

//! [Huffman coding] implementation of the HTTP/2 protocol.
//!
//! [Huffman Coding]: https://en.wikipedia.org/wiki/Huffman_coding
//!
//! # Huffman code in Http/2
//! There is a table of Huffman code in `RFC7541`. This [Huffman code] was
//! generated from statistics obtained on a large sample of HTTP headers. It
//! is a canonical Huffman code with some tweaking to ensure that no symbol
//! has a unique code length.
//!
//! The code table lives in `consts.rs`. Encoding packs codes into a `u64`
//! accumulator; decoding walks a binary code tree built from the same table
//! on first use.
//!
//! [Huffman Code]: https://www.rfc-editor.org/rfc/rfc7541.html#ref-HUFFMAN

mod consts;

use core::cmp::Ordering;
use std::sync::OnceLock;

use consts::HUFFMAN_ENCODE;

/// Converts a string to a Huffman code, and then put it into the
/// specified `Vec<u8>`.
pub(crate) fn huffman_encode(src: &[u8], dst: &mut Vec<u8>) {
    // We use `state` to hold temporary encoding state.
    // We use `unfilled` to represent the remaining number of bits that is not
    // filled. Each time any bytes are encoded, we will store the result bits
    // in `state`.
    //
    // When `state` is not full, we add the result bits to `Unfilled`.
    // `state`:
    // +----------+----------+----------------------------+
    // | Result A | Result B |          Unfilled          |
    // +----------+----------+----------------------------+
    // |<-------------------  64 bits  ------------------->
    //
    // When the length of the result bits is greater than the length of
    // `Unfilled`, we will truncate it.
    // `state`:
    // +---------------------+----------------------------+
    // |                     |     A part of Result C     | -> Output it.
    // +---------------------+----------------------------+
    // |<--------------  full 64 bits  ------------------->
    //
    // Final `state`:
    // +--------------------------------+-----------------+
    // | The remaining part of Result C |     Unfilled    |
    // +--------------------------------+-----------------+

    let mut state = 0u64;
    // The initial value of `unfilled` is equal to the number of bits in the
    // `state`.
    let mut unfilled = 64u32;

    for byte in src.iter() {
        let (nbits, code) = HUFFMAN_ENCODE[*byte as usize];
        let (nbits, code) = (nbits as u32, code as u64);
        match unfilled.cmp(&nbits) {
            Ordering::Greater => {
                state |= code << (unfilled - nbits);
                unfilled -= nbits;
            }
            Ordering::Equal => {
                state |= code;
                dst.extend_from_slice(&state.to_be_bytes());
                state = 0;
                unfilled = 64;
            }
            // We rotate the `code` to the right, and we will get `rotate`.
            // `rotate`:
            // +---------+-----------------+----------+
            // | Parts A |                 |  Parts B |
            // +---------+-----------------+----------+
            // `mask`:
            // +---------+-----------------+----------+
            // | 000...0 |         111...1            |
            // +---------+-----------------+----------+
            // `rotate` & mask => Parts B
            // `rotate` & !mask => Parts A
            Ordering::Less => {
                let rotate = code.rotate_right(nbits - unfilled);
                let mask = u64::MAX >> (64 - unfilled);
                state |= rotate & mask;
                dst.extend_from_slice(&state.to_be_bytes());
                state = rotate & !mask;
                unfilled = 64 - (nbits - unfilled);
            }
        }
    }

    // At the end of character encoding, if the last byte is not completely
    // filled, it needs to be filled with `0b1`.
    if unfilled != 64 {
        state |= u64::MAX >> (64 - unfilled);
        let bytes = &state.to_be_bytes();
        // Here we only need to output the filled bytes, not all the `state`.
        let len = (8 - (unfilled >> 3)) as usize;
        dst.extend_from_slice(&bytes.as_slice()[..len]);
    }
}

/// Converts a Huffman code into a literal string at one time, and then put it
/// into the specified `Vec<u8>`.
pub(crate) fn huffman_decode(src: &[u8], dst: &mut Vec<u8>) -> Result<(), HuffmanDecodeError> {
    let state = huffman_decode_inner(src, dst, DecodeState::new())?;
    state.finish()
}

/// A child slot in the decode tree. The high bit marks a leaf; the low bits
/// then hold the symbol (0-255 for octets, 256 for `EOS`). Otherwise the
/// value is the index of the next tree node.
const LEAF: u16 = 0x8000;

/// Unfilled child slot. Only present while the tree is being built; the
/// RFC7541 code is complete, so the finished tree has every slot filled.
const UNSET: u16 = u16::MAX;

/// Binary code tree built from `HUFFMAN_ENCODE`. Each node holds the two
/// child slots for a 0-bit and a 1-bit.
struct DecodeTree {
    nodes: Vec<[u16; 2]>,
}

impl DecodeTree {
    fn build() -> Self {
        let mut nodes = vec![[UNSET, UNSET]];
        for (symbol, (nbits, code)) in HUFFMAN_ENCODE.iter().enumerate() {
            let mut node = 0usize;
            for rest in (1..=*nbits).rev() {
                let bit = ((code >> (rest - 1)) & 1) as usize;
                if rest == 1 {
                    nodes[node][bit] = LEAF | (symbol as u16);
                } else if nodes[node][bit] == UNSET {
                    nodes.push([UNSET, UNSET]);
                    let next = (nodes.len() - 1) as u16;
                    nodes[node][bit] = next;
                    node = next as usize;
                } else {
                    node = nodes[node][bit] as usize;
                }
            }
        }
        Self { nodes }
    }
}

fn decode_tree() -> &'static DecodeTree {
    static TREE: OnceLock<DecodeTree> = OnceLock::new();
    TREE.get_or_init(DecodeTree::build)
}

/// Decoding state between two input slices: the current tree node, the
/// number of bits consumed since the last decoded symbol, and whether all of
/// those bits were `0b1` (a legal padding prefix).
struct DecodeState {
    node: u16,
    padding: u8,
    all_ones: bool,
}

impl DecodeState {
    fn new() -> Self {
        Self {
            node: 0,
            padding: 0,
            all_ones: true,
        }
    }

    /// Checks the state at the end of the input. The final bits of a Huffman
    /// string are either empty or a most-significant prefix of the `EOS`
    /// code: between 1 and 7 set bits.
    fn finish(&self) -> Result<(), HuffmanDecodeError> {
        if self.padding == 0 || (self.all_ones && self.padding <= 7) {
            Ok(())
        } else {
            Err(HuffmanDecodeError::InvalidHuffmanCode)
        }
    }
}

fn huffman_decode_inner(
    src: &[u8],
    dst: &mut Vec<u8>,
    state: DecodeState,
) -> Result<DecodeState, HuffmanDecodeError> {
    let tree = decode_tree();
    let mut state = state;

    for byte in src.iter() {
        for shift in (0..8).rev() {
            let bit = ((byte >> shift) & 1) as usize;
            let slot = tree.nodes[state.node as usize][bit];
            if slot & LEAF == LEAF {
                let symbol = slot & !LEAF;
                // The `EOS` symbol must never appear in the string itself.
                if symbol >= 256 {
                    return Err(HuffmanDecodeError::InvalidHuffmanCode);
                }
                dst.push(symbol as u8);
                state = DecodeState::new();
            } else {
                state.node = slot;
                state.padding = state.padding.saturating_add(1);
                state.all_ones &= bit == 1;
            }
        }
    }
    Ok(state)
}

/// Converts a Huffman code into a literal string, and then put it into the
/// specified `Vec<u8>`. Users can split the string into multiple slices and
/// then pass them into `HuffmanDecoder` to get the result.
pub(crate) struct HuffmanDecoder {
    state: DecodeState,
    vec: Vec<u8>,
}

impl HuffmanDecoder {
    /// Creates a new, empty `HuffmanDecoder`.
    pub(crate) fn new() -> Self {
        Self {
            state: DecodeState::new(),
            vec: Vec::new(),
        }
    }

    /// Decodes input string. Stop when the `src` is used up.
    pub(crate) fn decode(&mut self, src: &[u8]) -> Result<(), HuffmanDecodeError> {
        let state = std::mem::replace(&mut self.state, DecodeState::new());
        self.state = huffman_decode_inner(src, &mut self.vec, state)?;
        Ok(())
    }

    /// Finishes decoding and get the decoded result.
    pub(crate) fn finish(self) -> Result<Vec<u8>, HuffmanDecodeError> {
        self.state.finish()?;
        Ok(self.vec)
    }
}

/// Possible errors in Huffman decoding operations.
#[derive(Debug)]
pub(crate) enum HuffmanDecodeError {
    InvalidHuffmanCode,
}
