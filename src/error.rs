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

//! Errors that may occur in this crate.
//!
//! [`HpackError`] encapsulates every fault the codec can surface: invalid
//! compress input, SETTINGS violations and the malformed-wire conditions a
//! decoder can run into. All errors propagate to the caller; the codec never
//! recovers internally and never returns partial output.
//!
//! [`HpackError`]: HpackError

use core::fmt::{Debug, Display, Formatter};
use std::error::Error;

/// Errors that may occur when using this crate.
#[derive(Debug, Eq, PartialEq)]
pub struct HpackError {
    kind: ErrorKind,
}

impl HpackError {
    /// Gets the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<ErrorKind> for HpackError {
    fn from(kind: ErrorKind) -> Self {
        HpackError { kind }
    }
}

impl Display for HpackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for HpackError {}

/// Fault classification of [`HpackError`].
///
/// [`HpackError`]: HpackError
#[derive(Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A header in the compress input is missing its name.
    InvalidHeader,

    /// A `SETTINGS_HEADER_TABLE_SIZE` notification carried a non-positive
    /// value.
    Settings,

    /// An internal invariant was violated while compressing, such as an
    /// indexed emission without a valid index.
    Encoding,

    /// An HPACK integer was truncated or reached 2^31 during decoding.
    MalformedInteger,

    /// A string literal was truncated, was not valid UTF-8, or its Huffman
    /// code was invalid.
    MalformedString,

    /// An indexed representation referenced index 0 or an index outside the
    /// combined static and dynamic table bounds.
    IndexOutOfRange,

    /// A decoder fault not covered by a more specific kind: a header block
    /// that ends in the middle of a representation, a size-update placed
    /// after the start of a block, or a size-update exceeding the last
    /// `SETTINGS_HEADER_TABLE_SIZE` value.
    Decoding,
}
