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

use crate::error::HpackError;
use crate::headers::HeaderList;
use crate::representation::ReprEncoder;
use crate::settings::SettingsTracker;
use crate::table::DynamicTable;

/// Compressor implementation of [`HPACK`].
///
/// Owns the encoding-direction dynamic table. Each call to `encode` first
/// drains any pending `SETTINGS_HEADER_TABLE_SIZE` values into size-update
/// directives, then emits the header list in order.
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
pub(crate) struct HpackEncoder {
    table: DynamicTable,
    use_huffman: bool,
}

impl HpackEncoder {
    /// Creates a `HpackEncoder` with the given max dynamic table size and
    /// huffman usage.
    pub(crate) fn new(max_size: usize, use_huffman: bool) -> Self {
        Self {
            table: DynamicTable::with_max_size(max_size),
            use_huffman,
        }
    }

    /// Applies a new table capacity, evicting as necessary.
    pub(crate) fn update_size(&mut self, max_size: usize) {
        self.table.update_size(max_size);
    }

    /// Encodes one header block into `dst`, preceded by any pending
    /// size-update directives.
    pub(crate) fn encode(
        &mut self,
        headers: &HeaderList,
        settings: &mut SettingsTracker,
        dst: &mut Vec<u8>,
    ) -> Result<(), HpackError> {
        if settings.must_emit_update() {
            for max_size in settings.take_pending() {
                ReprEncoder::size_update(max_size, dst);
            }
        }
        ReprEncoder::new(&mut self.table).encode(headers, self.use_huffman, dst)
    }
}

#[cfg(test)]
mod ut_hpack_encoder {
    use crate::encoder::HpackEncoder;
    use crate::headers::HeaderList;
    use crate::settings::SettingsTracker;
    use crate::util::test_util::decode;

    /// UT test cases for `HpackEncoder`.
    ///
    /// # Brief
    /// 1. Creates a `HpackEncoder`.
    /// 2. Calls `HpackEncoder::encode()` function, passing in the specified
    ///    parameters.
    /// 3. Checks if the test results are correct.
    #[test]
    fn ut_hpack_encoder() {
        rfc7541_test_cases();

        macro_rules! hpack_test_cases {
            ($enc: expr, $res: literal, $size: expr, { $($h: literal => $v: literal),* $(,)? } $(,)?) => {
                let _encoder = $enc;
                let mut settings = SettingsTracker::new(4096);
                let headers: HeaderList = [$(($h, $v),)*].into_iter().collect();
                let mut dst = Vec::new();
                assert!(_encoder.encode(&headers, &mut settings, &mut dst).is_ok());
                assert_eq!(dst, decode($res).unwrap());
                assert_eq!(_encoder.table.curr_size(), $size);
            }
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.2.1. Literal Header Field with Indexing
            hpack_test_cases!(
                &mut HpackEncoder::new(4096, false),
                "400a637573746f6d2d6b65790d637573746f6d2d686561646572", 55,
                { "custom-key" => "custom-header" },
            );

            // C.2.4. Indexed Header Field
            hpack_test_cases!(
                &mut HpackEncoder::new(4096, false),
                "82", 0,
                { ":method" => "GET" },
            );

            // C.3. Request Examples without Huffman Coding
            {
                let mut encoder = HpackEncoder::new(4096, false);
                // C.3.1. First Request
                hpack_test_cases!(
                    &mut encoder,
                    "828684410f7777772e6578616d706c652e636f6d", 57,
                    {
                        ":method" => "GET",
                        ":scheme" => "http",
                        ":path" => "/",
                        ":authority" => "www.example.com",
                    },
                );

                // C.3.2. Second Request
                hpack_test_cases!(
                    &mut encoder,
                    "828684be58086e6f2d6361636865", 110,
                    {
                        ":method" => "GET",
                        ":scheme" => "http",
                        ":path" => "/",
                        ":authority" => "www.example.com",
                        "cache-control" => "no-cache",
                    },
                );

                // C.3.3. Third Request
                hpack_test_cases!(
                    &mut encoder,
                    "828785bf400a637573746f6d2d6b65790c637573746f6d2d76616c7565", 164,
                    {
                        ":method" => "GET",
                        ":scheme" => "https",
                        ":path" => "/index.html",
                        ":authority" => "www.example.com",
                        "custom-key" => "custom-value",
                    },
                );
            }

            // C.4. Request Examples with Huffman Coding
            {
                let mut encoder = HpackEncoder::new(4096, true);
                // C.4.1. First Request
                hpack_test_cases!(
                    &mut encoder,
                    "828684418cf1e3c2e5f23a6ba0ab90f4ff", 57,
                    {
                        ":method" => "GET",
                        ":scheme" => "http",
                        ":path" => "/",
                        ":authority" => "www.example.com",
                    },
                );

                // C.4.2. Second Request
                hpack_test_cases!(
                    &mut encoder,
                    "828684be5886a8eb10649cbf", 110,
                    {
                        ":method" => "GET",
                        ":scheme" => "http",
                        ":path" => "/",
                        ":authority" => "www.example.com",
                        "cache-control" => "no-cache",
                    },
                );

                // C.4.3. Third Request
                hpack_test_cases!(
                    &mut encoder,
                    "828785bf408825a849e95ba97d7f8925a849e95bb8e8b4bf", 164,
                    {
                        ":method" => "GET",
                        ":scheme" => "https",
                        ":path" => "/index.html",
                        ":authority" => "www.example.com",
                        "custom-key" => "custom-value",
                    },
                );
            }

            // C.5. Response Examples without Huffman Coding
            {
                let mut encoder = HpackEncoder::new(256, false);
                // C.5.1. First Response
                hpack_test_cases!(
                    &mut encoder,
                    "4803333032580770726976617465611d\
                    4d6f6e2c203231204f63742032303133\
                    2032303a31333a323120474d546e1768\
                    747470733a2f2f7777772e6578616d70\
                    6c652e636f6d",
                    222,
                    {
                        ":status" => "302",
                        "cache-control" => "private",
                        "date" => "Mon, 21 Oct 2013 20:13:21 GMT",
                        "location" => "https://www.example.com",
                    },
                );

                // C.5.2. Second Response
                hpack_test_cases!(
                    &mut encoder,
                    "4803333037c1c0bf", 222,
                    {
                        ":status" => "307",
                        "cache-control" => "private",
                        "date" => "Mon, 21 Oct 2013 20:13:21 GMT",
                        "location" => "https://www.example.com",
                    },
                );

                // C.5.3. Third Response
                hpack_test_cases!(
                    &mut encoder,
                    "88c1611d4d6f6e2c203231204f637420\
                    323031332032303a31333a323220474d\
                    54c05a04677a69707738666f6f3d4153\
                    444a4b48514b425a584f5157454f5049\
                    5541585157454f49553b206d61782d61\
                    67653d333630303b2076657273696f6e\
                    3d31",
                    215,
                    {
                        ":status" => "200",
                        "cache-control" => "private",
                        "date" => "Mon, 21 Oct 2013 20:13:22 GMT",
                        "location" => "https://www.example.com",
                        "content-encoding" => "gzip",
                        "set-cookie" => "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1",
                    },
                );
            }
        }
    }

    /// UT test cases for pending size-update emission.
    ///
    /// # Brief
    /// 1. Notifies two SETTINGS values before a block.
    /// 2. Checks that both directives are emitted in order and that the
    ///    queue is drained.
    #[test]
    fn ut_hpack_encoder_size_update() {
        let mut encoder = HpackEncoder::new(4096, false);
        let mut settings = SettingsTracker::new(4096);
        settings.notify(100);
        settings.notify(200);
        encoder.update_size(200);

        let mut dst = Vec::new();
        assert!(encoder
            .encode(&HeaderList::new(), &mut settings, &mut dst)
            .is_ok());
        assert_eq!(dst, decode("3f453fa901").unwrap());

        let mut dst = Vec::new();
        assert!(encoder
            .encode(&HeaderList::new(), &mut settings, &mut dst)
            .is_ok());
        assert!(dst.is_empty());
    }
}
