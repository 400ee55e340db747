// SPDX-License-Identifier: MIT OR Apache-2.0
//! Streaming NNTP response decoder.
//!
//! `nyuu_decode::Decoder` consumes bytes arriving from a Usenet server and
//! yields parsed [`Response`]s: a three-digit status code, dot-unstuffed body
//! lines, and — when the body is an article payload — decoded bytes plus
//! file name, size, part offsets and CRC32 (computed and expected). Payloads
//! are recognized in either of the two encodings still seen on Usenet today:
//! yEnc (with optional `=ypart` multi-part headers and a CRC32 footer) and
//! legacy uuencode.
//!
//! The crate owns no I/O: callers read network bytes into a decoder-owned
//! buffer ([`Decoder::writable_tail`]) and repeatedly call
//! [`Decoder::process`] to advance parsing and collect completed responses.
//! A [`crc32`] module exposes the CRC32 algebra (`combine`, `multiply`,
//! `zero_unpad`, `xpown`, `xpow8n`) needed to compose per-article CRCs into a
//! whole-file CRC without re-reading the underlying bytes.
//!
//! ```
//! use nyuu_decode::Decoder;
//!
//! let wire = b"220 0 <mid> article\r\n\
//! =ybegin line=128 size=12 name=hi.bin\r\n\
//! r\x8f\x96\x96\x99J\xa1\x99\x9c\x96\x8eK\r\n\
//! =yend size=12 crc32=1b851995\r\n\
//! .\r\n";
//!
//! let mut decoder = Decoder::new(4096);
//! let tail = decoder.writable_tail(wire.len());
//! tail[..wire.len()].copy_from_slice(wire);
//! let responses: Vec<_> = decoder.process(wire.len()).unwrap().collect();
//!
//! assert_eq!(responses.len(), 1);
//! assert_eq!(responses[0].data.as_deref(), Some(&b"Hello world!"[..]));
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]

mod decoder;
mod error;
mod header;
mod nntp;
mod response;
mod uu;
mod yenc;

pub mod crc32;

pub use decoder::Decoder;
pub use error::{DecoderError, ErrorKind};
pub use response::{Format, Response};
pub use yenc::{yenc_decode, yenc_encode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_only_response_carries_no_payload() {
        let wire = b"221 0 <mid>\r\nSubject: hi\r\n\r\nbody text\r\n.\r\n";
        let mut decoder = Decoder::new(256);
        let tail = decoder.writable_tail(wire.len());
        tail[..wire.len()].copy_from_slice(wire);
        let responses: Vec<_> = decoder.process(wire.len()).unwrap().collect();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status_code, 221);
        assert_eq!(responses[0].format, Format::None);
        assert_eq!(responses[0].file_name, None);
    }

    #[test]
    fn one_shot_yenc_decode_matches_streaming_decoder() {
        let article = b"=ybegin line=128 size=12 name=hi.bin\r\n\
r\x8f\x96\x96\x99J\xa1\x99\x9c\x96\x8eK\r\n\
=yend size=12 crc32=1b851995\r\n";
        let resp = yenc_decode(article);
        assert_eq!(resp.data.as_deref(), Some(&b"Hello world!"[..]));
        assert_eq!(resp.crc_computed, Some(0x1B85_1995));
        assert_eq!(resp.crc_expected, Some(0x1B85_1995));
    }
}
