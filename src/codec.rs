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

use crate::decoder::HpackDecoder;
use crate::encoder::HpackEncoder;
use crate::error::{ErrorKind, HpackError};
use crate::headers::HeaderList;
use crate::settings::SettingsTracker;

/// Initial dynamic table capacity of both directions, per `RFC7541`.
const DEFAULT_HEADER_TABLE_SIZE: usize = 4096;

/// The HPACK codec of one HTTP/2 endpoint direction pair.
///
/// A codec bundles an encoder and a decoder with their own dynamic tables,
/// plus the tracking of `SETTINGS_HEADER_TABLE_SIZE` changes. The two
/// directions are independent; they share only the immutable static table.
/// A codec instance is single-threaded; two instances may run on two threads
/// without coordination.
///
/// # Examples
///
/// ```
/// use ylong_hpack::{HeaderList, HpackCodec};
///
/// let mut sender = HpackCodec::new();
/// let mut receiver = HpackCodec::new();
///
/// let mut list = HeaderList::new();
/// list.push(":method", "GET");
/// list.push(":path", "/index.html");
///
/// let block = sender.compress(&list).unwrap().to_vec();
/// let decoded = receiver.decompress(&block).unwrap();
/// assert_eq!(decoded, list);
/// ```
pub struct HpackCodec {
    encoder: HpackEncoder,
    decoder: HpackDecoder,
    settings: SettingsTracker,
    buf: Vec<u8>,
}

impl HpackCodec {
    /// Creates a fresh codec: both tables empty at capacity 4096, no
    /// SETTINGS value received, Huffman coding of emitted strings enabled.
    pub fn new() -> Self {
        Self::with_huffman(true)
    }

    /// Creates a fresh codec with the given Huffman policy for emitted
    /// strings. The decoder accepts both string forms either way.
    pub fn with_huffman(use_huffman: bool) -> Self {
        Self {
            encoder: HpackEncoder::new(DEFAULT_HEADER_TABLE_SIZE, use_huffman),
            decoder: HpackDecoder::with_max_size(DEFAULT_HEADER_TABLE_SIZE),
            settings: SettingsTracker::new(DEFAULT_HEADER_TABLE_SIZE),
            buf: Vec::new(),
        }
    }

    /// Records a received `SETTINGS_HEADER_TABLE_SIZE` value.
    ///
    /// Both dynamic tables honour the new capacity immediately; the matching
    /// size-update directives are emitted at the start of the next
    /// [`compress`] call.
    ///
    /// [`compress`]: HpackCodec::compress
    pub fn notify_settings(&mut self, max_size: u32) -> Result<(), HpackError> {
        if max_size == 0 {
            return Err(ErrorKind::Settings.into());
        }
        let max_size = max_size as usize;
        self.settings.notify(max_size);
        self.encoder.update_size(max_size);
        self.decoder.update_size(max_size);
        Ok(())
    }

    /// Compresses a header list into one header block.
    ///
    /// The returned slice borrows the codec's output buffer, which is reused
    /// across calls: it is reset at the start of each `compress` and stays
    /// valid until the next call.
    pub fn compress(&mut self, headers: &HeaderList) -> Result<&[u8], HpackError> {
        self.buf.clear();
        self.encoder
            .encode(headers, &mut self.settings, &mut self.buf)?;
        Ok(self.buf.as_slice())
    }

    /// Decompresses one complete header block into a header list.
    ///
    /// Multiple `cookie` fields of the block are reassembled into a single
    /// field at the tail of the list, per HTTP/2. On failure the decoder
    /// state is undefined and the caller should tear down the connection.
    pub fn decompress(&mut self, buf: &[u8]) -> Result<HeaderList, HpackError> {
        self.decoder.decode(buf, &mut self.settings)
    }

    /// Releases the owned output buffer. Idempotent; the codec remains
    /// usable afterwards.
    pub fn dispose(&mut self) {
        self.buf = Vec::new();
    }
}

impl Default for HpackCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod ut_hpack_codec {
    use super::HpackCodec;
    use crate::error::ErrorKind;
    use crate::headers::HeaderList;

    /// UT test cases for `HpackCodec::notify_settings`.
    ///
    /// # Brief
    /// 1. Notifies a zero and a non-zero SETTINGS value.
    /// 2. Checks the error and the emitted size-update directives.
    #[test]
    fn ut_codec_notify_settings() {
        let mut codec = HpackCodec::new();
        let err = codec.notify_settings(0).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Settings);

        assert!(codec.notify_settings(4096).is_ok());
        let block = codec.compress(&HeaderList::new()).unwrap();
        // 4096 with a 5-bit prefix: 0x3f, then 4065 in continuation octets.
        assert_eq!(block, [0x3f, 0xe1, 0x1f]);
    }

    /// UT test cases for output buffer reuse.
    ///
    /// # Brief
    /// 1. Compresses two blocks on the same codec.
    /// 2. Checks that the buffer is reset between the calls and that
    ///    `dispose` is idempotent.
    #[test]
    fn ut_codec_buffer_reuse() {
        let mut codec = HpackCodec::new();
        let mut list = HeaderList::new();
        list.push(":method", "GET");

        assert_eq!(codec.compress(&list).unwrap(), [0x82]);
        assert_eq!(codec.compress(&list).unwrap(), [0x82]);

        codec.dispose();
        codec.dispose();
        assert_eq!(codec.compress(&list).unwrap(), [0x82]);
    }
}
