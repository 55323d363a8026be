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

#![allow(dead_code)]

//! `ylong_hpack` is an [HPACK] codec for the [HTTP/2 protocol]: it
//! compresses header lists into header blocks and parses header blocks back
//! into header lists.
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//! [HTTP/2 protocol]: https://httpwg.org/specs/rfc9113.html
//!
//! # Introduction
//! In [HTTP/1.1], header fields are not compressed. As web pages have grown
//! to require dozens to hundreds of requests, the redundant header fields in
//! these requests unnecessarily consume bandwidth, measurably increasing
//! latency.
//!
//! HPACK eliminates redundant header fields through a static table of common
//! fields, per-direction dynamic tables of recently transmitted fields, and
//! a static Huffman code for string literals, while keeping a bounded memory
//! requirement for use in constrained environments.
//!
//! This crate implements the codec state machine only: frame I/O, stream
//! multiplexing and the SETTINGS-frame transport belong to the surrounding
//! HTTP/2 connection. The caller reports `SETTINGS_HEADER_TABLE_SIZE`
//! changes through [`HpackCodec::notify_settings`] and the codec emits the
//! required dynamic-table size-update directives with the next block.
//!
//! [HTTP/1.1]: https://www.rfc-editor.org/rfc/rfc9112.html
//! [`HpackCodec::notify_settings`]: HpackCodec::notify_settings

pub mod error;
pub mod headers;

mod codec;
mod decoder;
mod encoder;
mod huffman;
mod integer;
mod representation;
mod settings;
mod table;

#[cfg(test)]
pub(crate) mod util;

pub use codec::HpackCodec;
pub use error::{ErrorKind, HpackError};
pub use headers::{Header, HeaderList};
