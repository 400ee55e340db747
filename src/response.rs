// SPDX-License-Identifier: MIT OR Apache-2.0
//! The decoded output of one NNTP response (spec.md §3 data model).

use strum_macros::Display;

/// Which payload encoding, if any, a [`Response`] carried.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// yEnc-encoded article payload.
    YEnc,
    /// Legacy uuencoded article payload.
    #[strum(serialize = "UU")]
    Uu,
    /// No recognized payload (status-only or plain informational response).
    #[default]
    None,
}

/// One fully parsed NNTP response: a status line, optionally followed by a
/// decoded article body or plain informational text lines.
///
/// Absent/zeroed fields represent spec.md §7's tolerated error conditions —
/// this type never carries an `Err`; `Decoder::process` only returns `Err`
/// for the two truly fatal conditions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    /// The NNTP reply code, or `0` for a malformed/truncated status line.
    pub status_code: u16,
    /// Plain text lines of a multi-line body that carried no recognized
    /// article payload (e.g. `HEAD`/capability responses).
    pub lines: Option<Vec<String>>,
    /// Decoded article bytes, if a payload was recognized and decoded.
    pub data: Option<Vec<u8>>,
    /// Which encoding, if any, produced `data`.
    pub format: Format,
    /// File name from `=ybegin name=` / uuencode `begin`, UTF-8 first, with
    /// a lossless Latin-1 fallback for invalid byte sequences.
    pub file_name: Option<String>,
    /// Whole-file size declared in `=ybegin size=`; `0` for uuencode or an
    /// unparseable/overflowing size.
    pub file_size: u64,
    /// 0-based inclusive start offset from `=ypart begin=`; `0` if absent
    /// or invalid.
    pub part_begin: u64,
    /// 1-based inclusive end offset from `=ypart end=`; `0` if absent or
    /// invalid.
    pub part_end: u64,
    /// `part_end - (part_begin_1_based) + 1`; `0` if absent or invalid.
    pub part_size: u64,
    /// CRC32 computed over `data`, if any payload was decoded.
    pub crc_computed: Option<u32>,
    /// CRC32 parsed from the `=yend` footer (`pcrc32=` preferred over
    /// `crc32=`); `None` if absent or malformed.
    pub crc_expected: Option<u32>,
    /// Total bytes placed into `data`.
    pub bytes_decoded: u64,
}

/// Decodes `bytes` as a Latin-1 fallback for a file name that failed UTF-8
/// validation: Latin-1 code points map 1:1 onto the first 256 Unicode
/// scalars, so this never fails.
#[must_use]
pub fn decode_name(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_name_prefers_utf8() {
        assert_eq!(decode_name("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn decode_name_falls_back_to_latin1() {
        // 0xE9 alone is invalid UTF-8 but is 'é' in Latin-1.
        assert_eq!(decode_name(&[0xE9]), "é");
    }

    #[test]
    fn default_format_is_none() {
        assert_eq!(Response::default().format, Format::None);
    }
}
