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

use core::cmp::Ordering;

use crate::error::{ErrorKind, HpackError};
use crate::huffman::HuffmanDecoder;
use crate::integer::IntegerDecoder;
use crate::representation::{Name, PrefixBit, Representation};

/// Decoder implementation for representations. Every call to `decode` parses
/// one `Representation` off the front of the buffer; once the buffer is
/// fully consumed, `decode` returns `None`. A block that ends in the middle
/// of a representation leaves the decoder partial, which the caller treats
/// as a truncated block.
pub(crate) struct ReprDecoder<'a> {
    /// `buf` represents the byte stream to be decoded.
    buf: &'a [u8],
    /// `state` represents the remaining state after the last call to
    /// `decode`.
    state: Option<ReprDecodeState>,
}

impl<'a> ReprDecoder<'a> {
    /// Creates a new `ReprDecoder` whose `state` is `None`.
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, state: None }
    }

    /// Decodes the next `Representation` of `self.buf`. Returns `Ok(None)`
    /// when the buffer is exhausted.
    pub(crate) fn decode(&mut self) -> Result<Option<Representation>, HpackError> {
        // If buf is empty, leave the state unchanged.
        if self.buf.is_empty() {
            return Ok(None);
        }

        // If `self.state` is `None`, start decoding from the `Index` state.
        match self
            .state
            .take()
            .unwrap_or_else(|| ReprDecodeState::Index(Index::new()))
            .decode(&mut self.buf)
        {
            DecResult::NeedMore(state) => {
                self.state = Some(state);
                Ok(None)
            }
            DecResult::Decoded(repr) => Ok(Some(repr)),
            DecResult::Error(error) => Err(error),
        }
    }

    /// Checks whether the decoder stopped in the middle of a representation.
    pub(crate) fn is_partial(&self) -> bool {
        self.state.is_some()
    }
}

macro_rules! state_def {
    ($name: ident, $decoded: ty, $($state: ident),* $(,)?) => {
        pub(crate) enum $name {
            $(
                $state($state),
            )*
        }

        impl $name {
            fn decode(self, buf: &mut &[u8]) -> DecResult<$decoded, $name> {
                match self {
                    $(
                        Self::$state(state) => state.decode(buf),
                    )*
                }
            }
        }

        $(
            impl From<$state> for $name {
                fn from(s: $state) -> Self {
                    Self::$state(s)
                }
            }
        )*
    }
}

// `Repr` decoding state diagram:
//
//                    ┌ `Index` ─ `IndexInner` ┬ `FirstByte`
//                    │                        └ `TrailingBytes`
//                    │
// `ReprDecodeState`  ┼ `NameString`  ┐                 ┌ `LengthFirstByte`
//                    │               ├ `LiteralString` ┼ `LengthTrailingBytes`
//                    └ `ValueString` ┘                 ├ `AsciiStringBytes`
//                                                      └ `HuffmanStringBytes`

state_def!(
    ReprDecodeState,
    Representation,
    Index,
    NameString,
    ValueString
);

state_def!(IndexInner, (PrefixBit, usize), FirstByte, TrailingBytes);

state_def!(
    LiteralString,
    Vec<u8>,
    LengthFirstByte,
    LengthTrailingBytes,
    AsciiStringBytes,
    HuffmanStringBytes,
);

/// `Index` is responsible for decoding the starting index part.
pub(crate) struct Index {
    inner: IndexInner,
}

impl Index {
    fn new() -> Self {
        Self::from_inner(FirstByte.into())
    }

    fn from_inner(inner: IndexInner) -> Self {
        Self { inner }
    }

    fn decode(self, buf: &mut &[u8]) -> DecResult<Representation, ReprDecodeState> {
        match self.inner.decode(buf) {
            // RFC7541-6.1: The index value of 0 is not used. It MUST be
            // treated as a decoding error if found in an indexed header
            // field representation.
            DecResult::Decoded((PrefixBit::INDEXED, 0)) => {
                HpackError::from(ErrorKind::IndexOutOfRange).into()
            }
            DecResult::Decoded((PrefixBit::INDEXED, index)) => {
                DecResult::Decoded(Representation::Indexed { index })
            }
            DecResult::Decoded((PrefixBit::SIZE_UPDATE, max_size)) => {
                DecResult::Decoded(Representation::SizeUpdate { max_size })
            }
            DecResult::Decoded((repr, 0)) => NameString::new(repr).decode(buf),
            DecResult::Decoded((repr, index)) => {
                ValueString::new(repr, Name::Index(index)).decode(buf)
            }
            DecResult::NeedMore(inner) => DecResult::NeedMore(Index::from_inner(inner).into()),
            DecResult::Error(e) => e.into(),
        }
    }
}

/// `NameString` is responsible for decoding the name string part.
pub(crate) struct NameString {
    repr: PrefixBit,
    inner: LiteralString,
}

impl NameString {
    fn new(repr: PrefixBit) -> Self {
        Self::from_inner(repr, LengthFirstByte.into())
    }

    fn from_inner(repr: PrefixBit, inner: LiteralString) -> Self {
        Self { repr, inner }
    }

    fn decode(self, buf: &mut &[u8]) -> DecResult<Representation, ReprDecodeState> {
        match self.inner.decode(buf) {
            DecResult::Decoded(octets) => {
                ValueString::new(self.repr, Name::Literal(octets)).decode(buf)
            }
            DecResult::NeedMore(inner) => {
                DecResult::NeedMore(Self::from_inner(self.repr, inner).into())
            }
            DecResult::Error(e) => e.into(),
        }
    }
}

/// `ValueString` is responsible for decoding the value string part.
pub(crate) struct ValueString {
    repr: PrefixBit,
    name: Name,
    inner: LiteralString,
}

impl ValueString {
    fn new(repr: PrefixBit, name: Name) -> Self {
        Self::from_inner(repr, name, LengthFirstByte.into())
    }

    fn from_inner(repr: PrefixBit, name: Name, inner: LiteralString) -> Self {
        Self { repr, name, inner }
    }

    fn decode(self, buf: &mut &[u8]) -> DecResult<Representation, ReprDecodeState> {
        match (self.repr, self.inner.decode(buf)) {
            (PrefixBit::LITERAL_WITH_INDEXING, DecResult::Decoded(value)) => {
                DecResult::Decoded(Representation::LiteralWithIndexing {
                    name: self.name,
                    value,
                })
            }
            (PrefixBit::LITERAL_WITHOUT_INDEXING, DecResult::Decoded(value)) => {
                DecResult::Decoded(Representation::LiteralWithoutIndexing {
                    name: self.name,
                    value,
                })
            }
            (_, DecResult::Decoded(value)) => {
                DecResult::Decoded(Representation::LiteralNeverIndexed {
                    name: self.name,
                    value,
                })
            }
            (_, DecResult::NeedMore(inner)) => {
                DecResult::NeedMore(Self::from_inner(self.repr, self.name, inner).into())
            }
            (_, DecResult::Error(e)) => e.into(),
        }
    }
}

/// `FirstByte` is responsible for decoding the first byte of the index of
/// `Representation`.
pub(crate) struct FirstByte;

impl FirstByte {
    fn decode(self, buf: &mut &[u8]) -> DecResult<(PrefixBit, usize), IndexInner> {
        if buf.is_empty() {
            return DecResult::NeedMore(self.into());
        }

        let byte = buf[0];
        let repr = PrefixBit::from_u8(byte);
        let mask = repr.prefix_index_mask();

        *buf = &buf[1..];
        match IntegerDecoder::first_byte(byte, mask.0) {
            Ok(idx) => DecResult::Decoded((repr, idx)),
            Err(int) => TrailingBytes::new(repr, int).decode(buf),
        }
    }
}

/// `TrailingBytes` is responsible for decoding the trailing bytes of the
/// index of `Representation`.
pub(crate) struct TrailingBytes {
    repr: PrefixBit,
    index: IntegerDecoder,
}

impl TrailingBytes {
    fn new(repr: PrefixBit, index: IntegerDecoder) -> Self {
        Self { repr, index }
    }

    fn decode(mut self, buf: &mut &[u8]) -> DecResult<(PrefixBit, usize), IndexInner> {
        loop {
            if buf.is_empty() {
                return DecResult::NeedMore(self.into());
            }

            let byte = buf[0];
            *buf = &buf[1..];
            match self.index.next_byte(byte) {
                Ok(None) => {}
                Ok(Some(index)) => return DecResult::Decoded((self.repr, index)),
                Err(e) => return e.into(),
            }
        }
    }
}

/// `LengthFirstByte` is responsible for decoding the first byte of a string
/// length. The high bit of that byte is the Huffman flag.
pub(crate) struct LengthFirstByte;

impl LengthFirstByte {
    fn decode(self, buf: &mut &[u8]) -> DecResult<Vec<u8>, LiteralString> {
        if buf.is_empty() {
            return DecResult::NeedMore(self.into());
        }

        let byte = buf[0];
        *buf = &buf[1..];
        match (
            IntegerDecoder::first_byte(byte, 0x7f),
            (byte & 0x80) == 0x80,
        ) {
            (Ok(len), true) => HuffmanStringBytes::new(len).decode(buf),
            (Ok(len), false) => AsciiStringBytes::new(len).decode(buf),
            (Err(int), huffman) => LengthTrailingBytes::new(huffman, int).decode(buf),
        }
    }
}

/// `LengthTrailingBytes` is responsible for decoding the trailing bytes of a
/// string length.
pub(crate) struct LengthTrailingBytes {
    is_huffman: bool,
    length: IntegerDecoder,
}

impl LengthTrailingBytes {
    fn new(is_huffman: bool, length: IntegerDecoder) -> Self {
        Self { is_huffman, length }
    }

    fn decode(mut self, buf: &mut &[u8]) -> DecResult<Vec<u8>, LiteralString> {
        loop {
            if buf.is_empty() {
                return DecResult::NeedMore(self.into());
            }

            let byte = buf[0];
            *buf = &buf[1..];
            match (self.length.next_byte(byte), self.is_huffman) {
                (Ok(None), _) => {}
                (Err(e), _) => return e.into(),
                (Ok(Some(length)), true) => return HuffmanStringBytes::new(length).decode(buf),
                (Ok(Some(length)), false) => return AsciiStringBytes::new(length).decode(buf),
            }
        }
    }
}

/// `AsciiStringBytes` is responsible for decoding a plain string literal of
/// the announced length.
pub(crate) struct AsciiStringBytes {
    octets: Vec<u8>,
    length: usize,
}

impl AsciiStringBytes {
    fn new(length: usize) -> Self {
        Self {
            octets: Vec::new(),
            length,
        }
    }

    fn decode(mut self, buf: &mut &[u8]) -> DecResult<Vec<u8>, LiteralString> {
        match (buf.len() + self.octets.len()).cmp(&self.length) {
            Ordering::Greater | Ordering::Equal => {
                let pos = self.length - self.octets.len();
                self.octets.extend_from_slice(&buf[..pos]);
                *buf = &buf[pos..];
                DecResult::Decoded(self.octets)
            }
            Ordering::Less => {
                self.octets.extend_from_slice(buf);
                *buf = &buf[buf.len()..];
                DecResult::NeedMore(self.into())
            }
        }
    }
}

/// `HuffmanStringBytes` is responsible for decoding a Huffman-coded string
/// literal of the announced length.
pub(crate) struct HuffmanStringBytes {
    huffman: HuffmanDecoder,
    read: usize,
    length: usize,
}

impl HuffmanStringBytes {
    fn new(length: usize) -> Self {
        Self {
            huffman: HuffmanDecoder::new(),
            read: 0,
            length,
        }
    }

    fn decode(mut self, buf: &mut &[u8]) -> DecResult<Vec<u8>, LiteralString> {
        match (buf.len() + self.read).cmp(&self.length) {
            Ordering::Greater | Ordering::Equal => {
                let pos = self.length - self.read;
                if self.huffman.decode(&buf[..pos]).is_err() {
                    return HpackError::from(ErrorKind::MalformedString).into();
                }
                *buf = &buf[pos..];
                match self.huffman.finish() {
                    Ok(vec) => DecResult::Decoded(vec),
                    Err(_) => HpackError::from(ErrorKind::MalformedString).into(),
                }
            }
            Ordering::Less => {
                if self.huffman.decode(buf).is_err() {
                    return HpackError::from(ErrorKind::MalformedString).into();
                }
                self.read += buf.len();
                *buf = &buf[buf.len()..];
                DecResult::NeedMore(self.into())
            }
        }
    }
}

/// Decoder's possible returns during the decoding process.
enum DecResult<D, S> {
    /// Decoder has got a `D`. Users can continue to call `decode` to try to
    /// get the next `D`.
    Decoded(D),

    /// Decoder needs more bytes to decode to get a `D`. Returns the current
    /// decoding state `S`.
    NeedMore(S),

    /// Errors that may occur when decoding.
    Error(HpackError),
}

impl<D, S> From<HpackError> for DecResult<D, S> {
    fn from(e: HpackError) -> Self {
        DecResult::Error(e)
    }
}

#[cfg(test)]
mod ut_repr_decoder {
    use super::*;
    use crate::util::test_util::decode;

    /// UT test cases for `ReprDecoder`.
    ///
    /// # Brief
    /// 1. Creates a `ReprDecoder`.
    /// 2. Calls `ReprDecoder::decode()` function, passing in the specified
    ///    parameters.
    /// 3. Checks if the test results are correct.
    #[test]
    fn ut_repr_decoder() {
        rfc7541_test_cases();

        macro_rules! inner_test_case {
            ($decoder: expr, SizeUpdate => $size: expr) => {
                match $decoder.decode() {
                    Ok(Some(Representation::SizeUpdate { max_size })) => {
                        assert_eq!($size, max_size)
                    }
                    _ => panic!("ReprDecoder::decode() failed!"),
                }
            };
            ($decoder: expr, $pat: ident => $name: expr) => {
                match $decoder.decode() {
                    Ok(Some(Representation::$pat { index })) => assert_eq!($name, index),
                    _ => panic!("ReprDecoder::decode() failed!"),
                }
            };
            ($decoder: expr, $pat: ident, $kind: ident => $name: expr, $value: expr) => {
                match $decoder.decode() {
                    Ok(Some(Representation::$pat {
                        name: Name::$kind(n),
                        value: v,
                    })) => {
                        assert_eq!($name, n);
                        assert_eq!($value, v);
                    }
                    _ => panic!("ReprDecoder::decode() failed!"),
                }
            };
        }

        macro_rules! repr_test_case {
            ($octets: literal, $({ $pat: ident $(, $kind: ident)? => $first: expr $(, $second: expr)?} $(,)?)*) => {
                let slice = decode($octets).unwrap();
                let mut decoder = ReprDecoder::new(&slice);
                $(
                    inner_test_case!(decoder, $pat $(, $kind)? => $first $(, $second)?);
                )*
                assert!(matches!(decoder.decode(), Ok(None)));
                assert!(!decoder.is_partial());
            }
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.2.1. Literal Header Field with Indexing
            repr_test_case!(
                "400a637573746f6d2d6b65790d637573746f6d2d686561646572",
                { LiteralWithIndexing, Literal => b"custom-key".to_vec(), b"custom-header".to_vec() }
            );

            // C.2.2. Literal Header Field without Indexing
            repr_test_case!(
                "040c2f73616d706c652f70617468",
                { LiteralWithoutIndexing, Index => 4, b"/sample/path".to_vec() }
            );

            // C.2.3. Literal Header Field Never Indexed
            repr_test_case!(
                "100870617373776f726406736563726574",
                { LiteralNeverIndexed, Literal => b"password".to_vec(), b"secret".to_vec() }
            );

            // C.2.4. Indexed Header Field
            repr_test_case!(
                "82",
                { Indexed => 2 }
            );

            // C.3.1. First Request
            repr_test_case!(
                "828684410f7777772e6578616d706c652e636f6d",
                { Indexed => 2 },
                { Indexed => 6 },
                { Indexed => 4 },
                { LiteralWithIndexing, Index => 1, b"www.example.com".to_vec() }
            );

            // C.3.2. Second Request
            repr_test_case!(
                "828684be58086e6f2d6361636865",
                { Indexed => 2 },
                { Indexed => 6 },
                { Indexed => 4 },
                { Indexed => 62 },
                { LiteralWithIndexing, Index => 24, b"no-cache".to_vec() }
            );

            // C.4.1. First Request
            repr_test_case!(
                "828684418cf1e3c2e5f23a6ba0ab90f4ff",
                { Indexed => 2 },
                { Indexed => 6 },
                { Indexed => 4 },
                { LiteralWithIndexing, Index => 1, b"www.example.com".to_vec() }
            );

            // C.4.3. Third Request
            repr_test_case!(
                "828785bf408825a849e95ba97d7f8925a849e95bb8e8b4bf",
                { Indexed => 2 },
                { Indexed => 7 },
                { Indexed => 5 },
                { Indexed => 63 },
                { LiteralWithIndexing, Literal => b"custom-key".to_vec(), b"custom-value".to_vec() }
            );

            // C.5.1. First Response
            repr_test_case!(
                "4803333032580770726976617465611d\
                4d6f6e2c203231204f63742032303133\
                2032303a31333a323120474d546e1768\
                747470733a2f2f7777772e6578616d70\
                6c652e636f6d",
                { LiteralWithIndexing, Index => 8, b"302".to_vec() },
                { LiteralWithIndexing, Index => 24, b"private".to_vec() },
                { LiteralWithIndexing, Index => 33, b"Mon, 21 Oct 2013 20:13:21 GMT".to_vec() },
                { LiteralWithIndexing, Index => 46, b"https://www.example.com".to_vec() }
            );

            // A size update directive before an indexed field.
            repr_test_case!(
                "3fe10182",
                { SizeUpdate => 256 },
                { Indexed => 2 }
            );
        }
    }

    /// UT test cases for malformed input.
    ///
    /// # Brief
    /// 1. Feeds an indexed representation with index 0, a truncated string
    ///    and an overlong integer to `ReprDecoder`.
    /// 2. Checks that decoding fails or stays partial.
    #[test]
    fn ut_repr_decoder_malformed() {
        // Index 0 on an indexed representation.
        let mut decoder = ReprDecoder::new(&[0x80]);
        assert!(decoder.decode().is_err());

        // Integer continuation reaching 2^31.
        let mut decoder = ReprDecoder::new(&[0xff, 0xff, 0xff, 0xff, 0xff, 0x7f]);
        assert!(decoder.decode().is_err());

        // A string cut off mid-octets stays partial.
        let slice = decode("400a637573746f6d").unwrap();
        let mut decoder = ReprDecoder::new(&slice);
        assert!(matches!(decoder.decode(), Ok(None)));
        assert!(decoder.is_partial());
    }
}
