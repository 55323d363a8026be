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

//! The [`Static Table`][static_table] and [`Dynamic Table`][dynamic_table]
//! implementation of [HPACK].
//!
//! [static_table]: https://httpwg.org/specs/rfc7541.html#static.table
//! [dynamic_table]: https://httpwg.org/specs/rfc7541.html#dynamic.table
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! Both directions of the codec address entries through a combined 1-based
//! index space: indices 1 through 61 select the static table, larger indices
//! select the dynamic table counting from its newest entry.
//!
//! Matching rules: name-only matches ignore ASCII case everywhere. Full
//! matches against the dynamic table compare name and value exactly, while
//! full matches against the static table ignore case.

use std::collections::VecDeque;

/// `TableSearcher` is used to find specified content in static and dynamic
/// tables.
pub(crate) struct TableSearcher<'a> {
    dynamic: &'a DynamicTable,
}

impl<'a> TableSearcher<'a> {
    pub(crate) fn new(dynamic: &'a DynamicTable) -> Self {
        Self { dynamic }
    }

    /// Searches a field name by combined index in static and dynamic tables.
    pub(crate) fn field_name(&self, index: usize) -> Option<String> {
        if index == 0 {
            return None;
        }
        if index <= STATIC_TABLE.len() {
            StaticTable::field_name(index).map(String::from)
        } else {
            self.dynamic.field_name(index - STATIC_TABLE.len() - 1)
        }
    }

    /// Searches a full field by combined index in static and dynamic tables.
    pub(crate) fn field(&self, index: usize) -> Option<(String, String)> {
        if index == 0 {
            return None;
        }
        if index <= STATIC_TABLE.len() {
            StaticTable::field(index).map(|(n, v)| (String::from(n), String::from(v)))
        } else {
            self.dynamic.field(index - STATIC_TABLE.len() - 1)
        }
    }

    /// Searches the best combined index for a field. Static-table matches
    /// take precedence over dynamic-table matches, and a full match anywhere
    /// beats a name-only match.
    pub(crate) fn index(&self, name: &str, value: &str) -> Option<TableIndex> {
        match (
            StaticTable::index(name, value),
            self.dynamic.index(name, value),
        ) {
            (x @ Some(TableIndex::Field(_)), _) => x,
            (_, Some(TableIndex::Field(i))) => {
                Some(TableIndex::Field(i + STATIC_TABLE.len() + 1))
            }
            (x @ Some(TableIndex::FieldName(_)), _) => x,
            (_, Some(TableIndex::FieldName(i))) => {
                Some(TableIndex::FieldName(i + STATIC_TABLE.len() + 1))
            }
            _ => None,
        }
    }
}

/// A search result: a full name/value match or a name-only match, carrying
/// the index the match was found at.
pub(crate) enum TableIndex {
    Field(usize),
    FieldName(usize),
}

/// The dynamic table consists of a list of header fields maintained in
/// first-in, first-out order. The first and newest entry is at the lowest
/// index, and the oldest entry is at the highest index.
///
/// The table is initially empty and can contain duplicate entries. Its
/// stored size is the sum of `|name| + |value| + 32` over all entries, and
/// is strictly bounded by the capacity: inserting evicts from the oldest end
/// until the new entry fits, and an entry larger than the whole capacity
/// empties the table without being inserted.
pub(crate) struct DynamicTable {
    queue: VecDeque<(String, String)>,
    curr_size: usize,
    max_size: usize,
}

impl DynamicTable {
    /// Creates a `DynamicTable` based on the size limit.
    pub(crate) fn with_max_size(max_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            curr_size: 0,
            max_size,
        }
    }

    pub(crate) fn curr_size(&self) -> usize {
        self.curr_size
    }

    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Gets a field name by its 0-based distance from the newest entry.
    pub(crate) fn field_name(&self, index: usize) -> Option<String> {
        self.queue.get(index).map(|(n, _)| n.clone())
    }

    /// Gets a full field by its 0-based distance from the newest entry.
    pub(crate) fn field(&self, index: usize) -> Option<(String, String)> {
        self.queue.get(index).cloned()
    }

    /// Inserts a field at the newest end of the table.
    ///
    /// Entries are evicted from the oldest end until the new entry fits. If
    /// the entry is larger than the table capacity, the table ends up empty
    /// and the entry is not inserted.
    pub(crate) fn update(&mut self, name: String, value: String) {
        // RFC7541-4.1: The additional 32 octets account for an estimated
        // overhead associated with an entry.
        let entry_size = name.len() + value.len() + 32;
        while self.curr_size + entry_size > self.max_size && !self.queue.is_empty() {
            self.evict();
        }
        if entry_size <= self.max_size {
            self.curr_size += entry_size;
            self.queue.push_front((name, value));
        }
    }

    /// Updates the table capacity, evicting from the oldest end until the
    /// stored size fits.
    pub(crate) fn update_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        while self.curr_size > self.max_size {
            self.evict();
        }
    }

    fn evict(&mut self) {
        if let Some((name, value)) = self.queue.pop_back() {
            self.curr_size -= name.len() + value.len() + 32;
        }
    }

    /// Tries to get the best index of a field. The newest match wins.
    fn index(&self, name: &str, value: &str) -> Option<TableIndex> {
        let mut index = None;
        for (n, (key, val)) in self.queue.iter().enumerate() {
            if key == name && val == value {
                return Some(TableIndex::Field(n));
            }
            if index.is_none() && key.eq_ignore_ascii_case(name) {
                index = Some(TableIndex::FieldName(n));
            }
        }
        index
    }
}

/// The static table of `RFC7541 Appendix A`: a predefined, immutable list of
/// common header fields, shared by both directions.
static STATIC_TABLE: [(&str, &str); 61] = [
    (":authority", ""),                   // 1
    (":method", "GET"),                   // 2
    (":method", "POST"),                  // 3
    (":path", "/"),                       // 4
    (":path", "/index.html"),             // 5
    (":scheme", "http"),                  // 6
    (":scheme", "https"),                 // 7
    (":status", "200"),                   // 8
    (":status", "204"),                   // 9
    (":status", "206"),                   // 10
    (":status", "304"),                   // 11
    (":status", "400"),                   // 12
    (":status", "404"),                   // 13
    (":status", "500"),                   // 14
    ("accept-charset", ""),               // 15
    ("accept-encoding", "gzip, deflate"), // 16
    ("accept-language", ""),              // 17
    ("accept-ranges", ""),                // 18
    ("accept", ""),                       // 19
    ("access-control-allow-origin", ""),  // 20
    ("age", ""),                          // 21
    ("allow", ""),                        // 22
    ("authorization", ""),                // 23
    ("cache-control", ""),                // 24
    ("content-disposition", ""),          // 25
    ("content-encoding", ""),             // 26
    ("content-language", ""),             // 27
    ("content-length", ""),               // 28
    ("content-location", ""),             // 29
    ("content-range", ""),                // 30
    ("content-type", ""),                 // 31
    ("cookie", ""),                       // 32
    ("date", ""),                         // 33
    ("etag", ""),                         // 34
    ("expect", ""),                       // 35
    ("expires", ""),                      // 36
    ("from", ""),                         // 37
    ("host", ""),                         // 38
    ("if-match", ""),                     // 39
    ("if-modified-since", ""),            // 40
    ("if-none-match", ""),                // 41
    ("if-range", ""),                     // 42
    ("if-unmodified-since", ""),          // 43
    ("last-modified", ""),                // 44
    ("link", ""),                         // 45
    ("location", ""),                     // 46
    ("max-forwards", ""),                 // 47
    ("proxy-authenticate", ""),           // 48
    ("proxy-authorization", ""),          // 49
    ("range", ""),                        // 50
    ("referer", ""),                      // 51
    ("refresh", ""),                      // 52
    ("retry-after", ""),                  // 53
    ("server", ""),                       // 54
    ("set-cookie", ""),                   // 55
    ("strict-transport-security", ""),    // 56
    ("transfer-encoding", ""),            // 57
    ("user-agent", ""),                   // 58
    ("vary", ""),                         // 59
    ("via", ""),                          // 60
    ("www-authenticate", ""),             // 61
];

struct StaticTable;

impl StaticTable {
    /// Gets a field name by the given 1-based index.
    fn field_name(index: usize) -> Option<&'static str> {
        STATIC_TABLE.get(index.checked_sub(1)?).map(|(n, _)| *n)
    }

    /// Gets a full field by the given 1-based index.
    fn field(index: usize) -> Option<(&'static str, &'static str)> {
        STATIC_TABLE.get(index.checked_sub(1)?).copied()
    }

    /// Tries to get the best index of a field. Static-table comparisons
    /// ignore ASCII case in both parts.
    fn index(name: &str, value: &str) -> Option<TableIndex> {
        let mut index = None;
        for (n, (key, val)) in STATIC_TABLE.iter().enumerate() {
            if key.eq_ignore_ascii_case(name) {
                if val.eq_ignore_ascii_case(value) {
                    return Some(TableIndex::Field(n + 1));
                }
                if index.is_none() {
                    index = Some(TableIndex::FieldName(n + 1));
                }
            }
        }
        index
    }
}

#[cfg(test)]
mod ut_dynamic_table {
    use super::{DynamicTable, StaticTable, TableIndex, TableSearcher};

    /// UT test cases for `DynamicTable::with_max_size`.
    ///
    /// # Brief
    /// 1. Calls `DynamicTable::with_max_size` to create a `DynamicTable`.
    /// 2. Checks the results.
    #[test]
    fn ut_dynamic_table_with_max_size() {
        let table = DynamicTable::with_max_size(4096);
        assert_eq!(table.len(), 0);
        assert_eq!(table.curr_size(), 0);
        assert_eq!(table.max_size(), 4096);
    }

    /// UT test cases for `DynamicTable::update`.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable` whose capacity holds one entry.
    /// 2. Inserts two entries of size 40 each.
    /// 3. Checks that the older entry was evicted and only the newest
    ///    remains.
    #[test]
    fn ut_dynamic_table_update() {
        let mut table = DynamicTable::with_max_size(64);
        table.update(String::from("abcd"), String::from("efgh"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.curr_size(), 40);

        table.update(String::from("wxyz"), String::from("mnop"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.curr_size(), 40);
        assert_eq!(
            table.field(0),
            Some((String::from("wxyz"), String::from("mnop")))
        );
    }

    /// UT test cases for oversized entries.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable` and fills it.
    /// 2. Inserts an entry larger than the whole capacity.
    /// 3. Checks that the table is empty and the entry was not inserted.
    #[test]
    fn ut_dynamic_table_oversized_entry() {
        let mut table = DynamicTable::with_max_size(64);
        table.update(String::from("abcd"), String::from("efgh"));
        assert_eq!(table.len(), 1);

        table.update(String::from("name"), "v".repeat(64));
        assert_eq!(table.len(), 0);
        assert_eq!(table.curr_size(), 0);
    }

    /// UT test cases for `DynamicTable::update_size`.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable` and inserts an entry.
    /// 2. Calls `DynamicTable::update_size` to shrink the capacity to zero.
    /// 3. Checks that the table was emptied.
    #[test]
    fn ut_dynamic_table_update_size() {
        let mut table = DynamicTable::with_max_size(128);
        table.update(String::from(":authority"), String::from("example.com"));
        assert_eq!(table.len(), 1);

        table.update_size(0);
        assert_eq!(table.len(), 0);
        assert!(table.field(0).is_none());
    }

    /// UT test cases for `DynamicTable::index`.
    ///
    /// # Brief
    /// 1. Inserts duplicate and case-varied entries.
    /// 2. Checks full-match and name-match lookups.
    #[test]
    fn ut_dynamic_table_index() {
        let mut table = DynamicTable::with_max_size(4096);
        table.update(String::from("custom-key"), String::from("old-value"));
        table.update(String::from("custom-key"), String::from("new-value"));

        // The newest full match wins.
        match table.index("custom-key", "new-value") {
            Some(TableIndex::Field(0)) => {}
            _ => panic!("DynamicTable::index() failed!"),
        }
        match table.index("custom-key", "old-value") {
            Some(TableIndex::Field(1)) => {}
            _ => panic!("DynamicTable::index() failed!"),
        }

        // Full matches are case-sensitive, name matches are not.
        match table.index("CUSTOM-KEY", "new-value") {
            Some(TableIndex::FieldName(0)) => {}
            _ => panic!("DynamicTable::index() failed!"),
        }
        assert!(table.index("missing", "x").is_none());
    }

    /// UT test cases for `StaticTable`.
    ///
    /// # Brief
    /// 1. Iterates over a range of indices, testing both
    ///    `StaticTable::field_name` and `StaticTable::field`.
    /// 2. Verifies the presence or absence of entries based on the index.
    #[test]
    fn ut_static_table() {
        assert_eq!(StaticTable::field(1), Some((":authority", "")));
        assert_eq!(StaticTable::field(2), Some((":method", "GET")));
        assert_eq!(StaticTable::field(61), Some(("www-authenticate", "")));
        for index in 1..65 {
            if index < 62 {
                assert!(StaticTable::field_name(index).is_some());
                assert!(StaticTable::field(index).is_some());
            } else {
                assert!(StaticTable::field_name(index).is_none());
                assert!(StaticTable::field(index).is_none());
            }
        }
        assert!(StaticTable::field_name(0).is_none());
        assert!(StaticTable::field(0).is_none());

        // Static comparisons ignore case in both parts.
        match StaticTable::index(":METHOD", "get") {
            Some(TableIndex::Field(2)) => {}
            _ => panic!("StaticTable::index() failed!"),
        }
        match StaticTable::index(":method", "PUT") {
            Some(TableIndex::FieldName(2)) => {}
            _ => panic!("StaticTable::index() failed!"),
        }
    }

    /// UT test cases for `TableSearcher`.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable` holding one entry.
    /// 2. Checks combined addressing and the static-first search order.
    #[test]
    fn ut_table_searcher() {
        let mut table = DynamicTable::with_max_size(4096);
        table.update(String::from(":authority"), String::from("example.com"));
        let searcher = TableSearcher::new(&table);

        assert_eq!(searcher.field(2), Some((String::from(":method"), String::from("GET"))));
        assert_eq!(
            searcher.field(62),
            Some((String::from(":authority"), String::from("example.com")))
        );
        assert_eq!(searcher.field_name(62), Some(String::from(":authority")));
        assert!(searcher.field(0).is_none());
        assert!(searcher.field(63).is_none());

        // A dynamic full match beats the static name-only match.
        match searcher.index(":authority", "example.com") {
            Some(TableIndex::Field(62)) => {}
            _ => panic!("TableSearcher::index() failed!"),
        }
        // A static name-only match beats the dynamic one.
        match searcher.index(":authority", "other.com") {
            Some(TableIndex::FieldName(1)) => {}
            _ => panic!("TableSearcher::index() failed!"),
        }
    }
}
