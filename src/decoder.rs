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
use crate::representation::{Name, ReprDecoder, Representation};
use crate::settings::SettingsTracker;
use crate::table::{DynamicTable, TableSearcher};

/// Decompressor implementation of [`HPACK`].
///
/// Owns the decoding-direction dynamic table. Each call to `decode` parses
/// one complete header block and returns the decoded header list; a failed
/// call leaves the decoder state undefined and the connection should be torn
/// down by the caller.
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
pub(crate) struct HpackDecoder {
    table: DynamicTable,
}

impl HpackDecoder {
    /// Creates a `HpackDecoder` with the given max dynamic table size.
    pub(crate) fn with_max_size(max_size: usize) -> Self {
        Self {
            table: DynamicTable::with_max_size(max_size),
        }
    }

    /// Applies a new table capacity, evicting as necessary.
    pub(crate) fn update_size(&mut self, max_size: usize) {
        self.table.update_size(max_size);
    }

    /// Decodes one complete header block.
    pub(crate) fn decode(
        &mut self,
        buf: &[u8],
        settings: &mut SettingsTracker,
    ) -> Result<HeaderList, HpackError> {
        let mut decoder = ReprDecoder::new(buf);
        let mut updater = Updater::new(&mut self.table, settings);
        loop {
            match decoder.decode()? {
                Some(repr) => updater.update(repr)?,
                None => break,
            }
        }
        // A block must not end in the middle of a representation.
        if decoder.is_partial() {
            return Err(ErrorKind::Decoding.into());
        }
        let mut list = updater.finish();
        join_cookies(&mut list);
        Ok(list)
    }
}

/// Per HTTP/2, multiple `cookie` header fields of one block are concatenated
/// into a single field using the two-octet delimiter "; ". The joined entry
/// goes to the tail of the list and carries no trailing delimiter.
fn join_cookies(list: &mut HeaderList) {
    let values: Vec<String> = list
        .iter()
        .filter(|h| h.name_eq_ignore_case("cookie"))
        .map(|h| h.value().to_owned())
        .collect();
    if values.is_empty() {
        return;
    }
    list.retain(|h| !h.name_eq_ignore_case("cookie"));
    list.push("cookie", values.join("; "));
}

/// `Updater` applies decoded representations to the dynamic table and the
/// result list.
struct Updater<'a> {
    table: &'a mut DynamicTable,
    settings: &'a mut SettingsTracker,
    list: HeaderList,
    block_started: bool,
}

impl<'a> Updater<'a> {
    fn new(table: &'a mut DynamicTable, settings: &'a mut SettingsTracker) -> Self {
        Self {
            table,
            settings,
            list: HeaderList::new(),
            block_started: false,
        }
    }

    fn update(&mut self, repr: Representation) -> Result<(), HpackError> {
        match repr {
            Representation::SizeUpdate { max_size } => self.update_table_size(max_size),
            repr => {
                self.block_started = true;
                match repr {
                    Representation::Indexed { index } => self.update_indexed(index),
                    Representation::LiteralWithIndexing { name, value } => {
                        self.update_literal_with_indexing(name, value)
                    }
                    Representation::LiteralWithoutIndexing { name, value }
                    | Representation::LiteralNeverIndexed { name, value } => {
                        self.update_literal_without_indexing(name, value)
                    }
                    Representation::SizeUpdate { .. } => unreachable!(),
                }
            }
        }
    }

    fn finish(self) -> HeaderList {
        self.list
    }

    fn update_indexed(&mut self, index: usize) -> Result<(), HpackError> {
        let searcher = TableSearcher::new(self.table);
        let (name, value) = searcher
            .field(index)
            .ok_or(HpackError::from(ErrorKind::IndexOutOfRange))?;
        self.list.push(name, value);
        Ok(())
    }

    fn update_literal_with_indexing(
        &mut self,
        name: Name,
        value: Vec<u8>,
    ) -> Result<(), HpackError> {
        let (name, value) = self.field_by_name_and_value(name, value)?;
        self.table.update(name.clone(), value.clone());
        self.list.push(name, value);
        Ok(())
    }

    fn update_literal_without_indexing(
        &mut self,
        name: Name,
        value: Vec<u8>,
    ) -> Result<(), HpackError> {
        let (name, value) = self.field_by_name_and_value(name, value)?;
        self.list.push(name, value);
        Ok(())
    }

    /// A size-update directive is accepted only at the start of a header
    /// block or immediately following another size-update directive, and,
    /// once a SETTINGS value has been received, must not exceed it.
    fn update_table_size(&mut self, max_size: usize) -> Result<(), HpackError> {
        if self.block_started || !self.settings.accepts(max_size) {
            return Err(ErrorKind::Decoding.into());
        }
        self.table.update_size(max_size);
        self.settings.apply(max_size);
        Ok(())
    }

    fn field_by_name_and_value(
        &self,
        name: Name,
        value: Vec<u8>,
    ) -> Result<(String, String), HpackError> {
        let name = match name {
            Name::Index(index) => {
                let searcher = TableSearcher::new(self.table);
                searcher
                    .field_name(index)
                    .ok_or(HpackError::from(ErrorKind::IndexOutOfRange))?
            }
            Name::Literal(octets) => string_from_octets(octets)?,
        };
        let value = string_from_octets(value)?;
        Ok((name, value))
    }
}

/// Materializes wire-decoded octets, rejecting strings that are not valid
/// UTF-8.
fn string_from_octets(octets: Vec<u8>) -> Result<String, HpackError> {
    String::from_utf8(octets).map_err(|_| HpackError::from(ErrorKind::MalformedString))
}
