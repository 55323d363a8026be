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

use crate::error::{ErrorKind, HpackError};
use crate::headers::HeaderList;
use crate::huffman::huffman_encode;
use crate::integer::write_integer;
use crate::representation::PrefixIndexMask;
use crate::table::{DynamicTable, TableIndex, TableSearcher};

/// Encoder implementation for representations. Each header of the input
/// list is emitted as either an indexed field or a literal with incremental
/// indexing, appended to the output vector.
pub(crate) struct ReprEncoder<'a> {
    table: &'a mut DynamicTable,
}

impl<'a> ReprEncoder<'a> {
    /// Creates a new `ReprEncoder` over the given dynamic table.
    pub(crate) fn new(table: &'a mut DynamicTable) -> Self {
        Self { table }
    }

    /// Encodes the headers of `headers`, in list order, into `dst`.
    ///
    /// A header that fully matches a table entry is emitted as an indexed
    /// field; anything else becomes a literal with incremental indexing
    /// (name-indexed where a name match exists) and is inserted into the
    /// dynamic table.
    pub(crate) fn encode(
        &mut self,
        headers: &HeaderList,
        use_huffman: bool,
        dst: &mut Vec<u8>,
    ) -> Result<(), HpackError> {
        for header in headers.iter() {
            if header.name().is_empty() {
                return Err(ErrorKind::InvalidHeader.into());
            }
            let searcher = TableSearcher::new(self.table);
            match searcher.index(header.name(), header.value()) {
                Some(TableIndex::Field(index)) => indexed(index, dst)?,
                Some(TableIndex::FieldName(index)) => {
                    indexing(index, header.value(), use_huffman, dst);
                    self.table
                        .update(header.name().to_owned(), header.value().to_owned());
                }
                None => {
                    indexing_with_name(header.name(), header.value(), use_huffman, dst);
                    self.table
                        .update(header.name().to_owned(), header.value().to_owned());
                }
            }
        }
        Ok(())
    }

    /// Appends a dynamic table size update directive to `dst`.
    pub(crate) fn size_update(max_size: usize, dst: &mut Vec<u8>) {
        write_integer(max_size, PrefixIndexMask::SIZE_UPDATE.0, 0x20, dst);
    }
}

/// `Indexed Header Field`: a single integer with a 7-bit prefix and the
/// `1xxxxxxx` flag pattern.
fn indexed(index: usize, dst: &mut Vec<u8>) -> Result<(), HpackError> {
    // Index 0 is reserved on the wire; emitting it would corrupt the block.
    if index == 0 {
        return Err(ErrorKind::Encoding.into());
    }
    write_integer(index, PrefixIndexMask::INDEXED.0, 0x80, dst);
    Ok(())
}

/// `Literal Header Field with Incremental Indexing -- Indexed Name`: the
/// name index with a 6-bit prefix and the `01xxxxxx` flag pattern, followed
/// by the value string.
fn indexing(index: usize, value: &str, use_huffman: bool, dst: &mut Vec<u8>) {
    write_integer(index, PrefixIndexMask::LITERAL_WITH_INDEXING.0, 0x40, dst);
    write_string(value.as_bytes(), use_huffman, dst);
}

/// `Literal Header Field with Incremental Indexing -- New Name`: index 0,
/// then the name string and the value string.
fn indexing_with_name(name: &str, value: &str, use_huffman: bool, dst: &mut Vec<u8>) {
    write_integer(0, PrefixIndexMask::LITERAL_WITH_INDEXING.0, 0x40, dst);
    write_string(name.as_bytes(), use_huffman, dst);
    write_string(value.as_bytes(), use_huffman, dst);
}

/// Appends a string literal: the Huffman flag and length with a 7-bit
/// prefix, then the octets.
fn write_string(octets: &[u8], use_huffman: bool, dst: &mut Vec<u8>) {
    if use_huffman {
        let mut encoded = Vec::with_capacity(octets.len());
        huffman_encode(octets, &mut encoded);
        write_integer(encoded.len(), 0x7f, 0x80, dst);
        dst.extend_from_slice(&encoded);
    } else {
        write_integer(octets.len(), 0x7f, 0x00, dst);
        dst.extend_from_slice(octets);
    }
}
