// SPDX-License-Identifier: MIT OR Apache-2.0
//! yEnc byte decoder (component B) and the one-shot free functions built on
//! top of it (`yenc_decode`, `yenc_encode`).

use crate::crc32;
use crate::header;
use crate::response::{Format, Response};

/// Stateful yEnc byte decoder. Carries the single-bit escape flag across
/// calls to [`YencDecoder::decode_chunk`], so a chunk boundary that lands
/// right after a bare `=` is resolved transparently by the next call.
#[derive(Debug, Default, Clone, Copy)]
pub struct YencDecoder {
    escape_pending: bool,
}

impl YencDecoder {
    /// Creates a decoder with no pending escape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the previous chunk ended on an unresolved `=` escape.
    #[must_use]
    pub fn escape_pending(&self) -> bool {
        self.escape_pending
    }

    /// Decodes `input`, appending decoded bytes to `out` and folding them
    /// into the rolling CRC `state` (see [`crate::crc32::update`]).
    ///
    /// `\r`/`\n` bytes are dropped rather than decoded — they are wire line
    /// framing, not payload. An escape byte who's matching data byte hasn't
    /// arrived yet leaves `self.escape_pending()` true; the next call
    /// consumes it as the first byte of `input`.
    pub fn decode_chunk(&mut self, input: &[u8], out: &mut Vec<u8>, crc_state: &mut u32) {
        for &c in input {
            if self.escape_pending {
                let byte = c.wrapping_sub(64).wrapping_sub(42);
                out.push(byte);
                *crc_state = crc32::update(*crc_state, core::slice::from_ref(&byte));
                self.escape_pending = false;
            } else if c == b'=' {
                self.escape_pending = true;
            } else if c == b'\r' || c == b'\n' {
                // line framing, not payload
            } else {
                let byte = c.wrapping_sub(42);
                out.push(byte);
                *crc_state = crc32::update(*crc_state, core::slice::from_ref(&byte));
            }
        }
    }
}

/// Decodes a single standalone yEnc article (already extracted from its
/// NNTP envelope — no status line, no dot-stuffing, no `.` terminator is
/// expected here).
///
/// If the input contains an `=ybegin` line, it is parsed for metadata
/// (`name=`, `size=`, and any `=ypart`/`=yend` that follow) the same way the
/// streaming [`crate::Decoder`] does. If no `=ybegin` line is present at
/// all, the entire input is treated as raw yEnc payload bytes (this is what
/// lets a bare encoded blob like a textbook "Hello world!" example decode
/// with no framing whatsoever).
#[must_use]
pub fn yenc_decode(bytes: &[u8]) -> Response {
    let mut resp = Response {
        format: Format::YEnc,
        ..Response::default()
    };
    let mut yenc = YencDecoder::new();
    let mut crc_state = crc32::INITIAL_STATE;
    let mut data = Vec::new();
    let mut in_header = true;
    let mut part_locked_invalid = false;

    for raw_line in split_lines(bytes) {
        if in_header && raw_line.starts_with(b"=ybegin ") {
            let fields = header::parse_ybegin(raw_line);
            resp.file_name = fields.name;
            match fields.size {
                Some(size) => resp.file_size = size,
                None => {
                    resp.file_size = 0;
                    part_locked_invalid = true;
                }
            }
            in_header = false;
            continue;
        }
        if !in_header && raw_line.starts_with(b"=ypart ") {
            if !part_locked_invalid {
                header::apply_ypart(header::parse_ypart(raw_line), &mut resp);
            }
            continue;
        }
        if !in_header && raw_line.starts_with(b"=yend") {
            let fields = header::parse_yend(raw_line);
            resp.crc_expected = fields.crc_expected();
            continue;
        }
        yenc.decode_chunk(raw_line, &mut data, &mut crc_state);
    }

    resp.bytes_decoded = data.len() as u64;
    resp.crc_computed = Some(crc32::finalize(crc_state));
    resp.data = Some(data);
    resp
}

/// Splits `bytes` on `\r\n` (falling back to bare `\n`), yielding each line
/// without its terminator. The final fragment is yielded even if it has no
/// trailing terminator at all.
fn split_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes.split(|&b| b == b'\n').map(|line| {
        if let Some(stripped) = line.strip_suffix(b"\r") {
            stripped
        } else {
            line
        }
    })
}

/// A trivial yEnc encoder: only escapes the three bytes whose unescaped
/// appearance in a decode stream would change the result (`\r`, `\n`, the
/// escape marker `=`). Real yEnc encoders additionally escape a handful of
/// other bytes for line-editing/robustness reasons that don't affect this
/// crate's decoder; `yenc_decode(yenc_encode(x).0) == x` is all this
/// function needs to guarantee.
#[must_use]
pub fn yenc_encode(bytes: &[u8]) -> (Vec<u8>, u32) {
    let mut out = Vec::with_capacity(bytes.len());
    let mut crc_state = crc32::INITIAL_STATE;
    for &b in bytes {
        crc_state = crc32::update(crc_state, core::slice::from_ref(&b));
        let encoded = b.wrapping_add(42);
        match encoded {
            0x0D | 0x0A | 0x3D => {
                out.push(b'=');
                out.push(encoded.wrapping_add(64));
            }
            _ => out.push(encoded),
        }
    }
    (out, crc32::finalize(crc_state))
}
