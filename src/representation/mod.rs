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

//! [Header Field Representation] implementation of [HPACK].
//!
//! [Header Field Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-2.4
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! An encoded header field is represented either as an index into the
//! combined table space or as a literal, and a header block may additionally
//! carry dynamic-table size updates. The five forms are distinguished by the
//! leading bits of their first octet; classification is a single priority
//! cascade over those bits.

mod decoder;
mod encoder;

pub(crate) use decoder::ReprDecoder;
pub(crate) use encoder::ReprEncoder;

/// Definition of each of the different [header field representations] and
/// the [dynamic table size update] instruction.
///
/// [header field representations]: https://www.rfc-editor.org/rfc/rfc7541.html#section-3.2
/// [dynamic table size update]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.3
pub(crate) enum Representation {
    /// An indexed header field identifies an entry in either the static
    /// table or the dynamic table and causes that field to be added to the
    /// decoded header list.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 1 |        Index (7+)         |
    /// +---+---------------------------+
    /// ```
    Indexed { index: usize },

    /// A literal header field with incremental indexing appends a field to
    /// the decoded header list and inserts it as a new entry into the
    /// dynamic table. The name is either an index or a literal string; the
    /// value is always a literal string.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |      Index (6+)       |
    /// +---+---+-----------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    /// An index of 0 is followed by a name string before the value string.
    LiteralWithIndexing { name: Name, value: Vec<u8> },

    /// A literal header field without indexing appends a field to the
    /// decoded header list without altering the dynamic table. Starts with
    /// the '0000' 4-bit pattern; the layout after the prefix matches
    /// `LiteralWithIndexing`.
    LiteralWithoutIndexing { name: Name, value: Vec<u8> },

    /// A literal header field never indexed behaves like
    /// `LiteralWithoutIndexing` on this hop, and additionally instructs
    /// intermediaries to keep the literal form when re-encoding. Starts with
    /// the '0001' 4-bit pattern.
    LiteralNeverIndexed { name: Name, value: Vec<u8> },

    /// A dynamic table size update signals a change to the size of the
    /// dynamic table. It is only legal at the start of a header block.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 1 |   Max size (5+)   |
    /// +---+---+---+-------------------+
    /// ```
    SizeUpdate { max_size: usize },
}

/// Prefix bit of `Representation`.
///
/// # Binary Format
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | PrefixBit |       Value       |
/// +---+---+---+-------------------+
/// ```
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) struct PrefixBit(u8);

impl PrefixBit {
    pub(crate) const INDEXED: Self = Self(0x80);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x40);
    pub(crate) const SIZE_UPDATE: Self = Self(0x20);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x10);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x00);

    /// Creates a `PrefixBit` from a byte. The interface will convert the
    /// incoming byte to the most suitable prefix bit.
    pub(crate) fn from_u8(byte: u8) -> Self {
        match byte {
            x if x >= 0x80 => Self::INDEXED,
            x if x >= 0x40 => Self::LITERAL_WITH_INDEXING,
            x if x >= 0x20 => Self::SIZE_UPDATE,
            x if x >= 0x10 => Self::LITERAL_NEVER_INDEXED,
            _ => Self::LITERAL_WITHOUT_INDEXING,
        }
    }

    /// Returns the corresponding `PrefixIndexMask` according to the current
    /// prefix bit.
    pub(crate) fn prefix_index_mask(&self) -> PrefixIndexMask {
        match self.0 {
            0x80 => PrefixIndexMask::INDEXED,
            0x40 => PrefixIndexMask::LITERAL_WITH_INDEXING,
            0x20 => PrefixIndexMask::SIZE_UPDATE,
            0x10 => PrefixIndexMask::LITERAL_NEVER_INDEXED,
            _ => PrefixIndexMask::LITERAL_WITHOUT_INDEXING,
        }
    }
}

/// Prefix index mask of `Representation`: the low bits of the first octet
/// that start the integer.
pub(crate) struct PrefixIndexMask(pub(crate) u8);

impl PrefixIndexMask {
    pub(crate) const INDEXED: Self = Self(0x7f);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x3f);
    pub(crate) const SIZE_UPDATE: Self = Self(0x1f);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x0f);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x0f);
}

/// Name of a literal representation. It can be represented as a string
/// literal or an index into the combined table space.
pub(crate) enum Name {
    Index(usize),
    Literal(Vec<u8>),
}
