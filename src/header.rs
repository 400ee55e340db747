// SPDX-License-Identifier: MIT OR Apache-2.0
//! Header scanner (component D): `=ybegin`/`=ypart`/`=yend` and uuencode
//! `begin`/`end` line recognition and key=value extraction.

use log::{debug, warn};

use crate::error::ErrorKind;
use crate::response::Response;

/// 10 MiB per-article payload cap (spec.md §3).
pub const MAX_PART_SIZE: u64 = 10 * 1024 * 1024;

/// Fields parsed from an `=ybegin` line.
#[derive(Debug, Default)]
pub struct YBeginFields {
    pub name: Option<String>,
    pub size: Option<u64>,
    pub part: Option<u64>,
    pub total: Option<u64>,
}

/// Fields parsed from an `=ypart` line.
#[derive(Debug, Default)]
pub struct YPartFields {
    pub begin: Option<u64>,
    pub end: Option<u64>,
}

/// Fields parsed from an `=yend` line.
#[derive(Debug, Default)]
pub struct YEndFields {
    pub size: Option<u64>,
    pub crc32: Option<u32>,
    pub pcrc32: Option<u32>,
}

impl YEndFields {
    /// `pcrc32` (per-part) takes priority over `crc32` (whole-file), per
    /// `sabctools`: the whole-file field is only meaningful on a single-part
    /// post or the final part of a multi-part one.
    #[must_use]
    pub fn crc_expected(&self) -> Option<u32> {
        self.pcrc32.or(self.crc32)
    }
}

/// Splits `line` into its space-delimited `key=value` tokens. `name=` is not
/// handled here — see [`tokenize_with_name`] — because a file name may
/// contain raw bytes that aren't valid UTF-8, which this string-based
/// tokenizer can't carry.
fn tokenize(line: &str) -> std::collections::HashMap<&str, &str> {
    let mut map = std::collections::HashMap::new();
    for tok in line.split_ascii_whitespace() {
        if let Some((k, v)) = tok.split_once('=') {
            map.insert(k, v);
        }
    }
    map
}

/// Locates a `name=` field in a raw header line and decodes everything from
/// it to the end of line as the file name (UTF-8 first, Latin-1 fallback —
/// see [`crate::response::decode_name`]), so a non-UTF-8 file name byte
/// doesn't get mangled before we even look for it. Returns the byte slice
/// before `name=` (for ordinary key=value tokenizing) alongside the decoded
/// name, if any.
fn split_name_field(raw_line: &[u8]) -> (&[u8], Option<String>) {
    match find_subslice(raw_line, b"name=") {
        Some(idx) => {
            let name_bytes = &raw_line[idx + 5..];
            let trimmed = name_bytes
                .iter()
                .rposition(|b| !b.is_ascii_whitespace())
                .map_or(&name_bytes[..0], |end| &name_bytes[..=end]);
            (&raw_line[..idx], Some(crate::response::decode_name(trimmed)))
        }
        None => (raw_line, None),
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parses an `=ybegin ` line. Required keys per spec.md are `line`, `size`,
/// `name`; `part`/`total` are optional. An unparseable or overflowing `size`
/// is tolerated: the caller is left to zero `file_size` and lock the part
/// fields (see [`crate::Response`] invariants).
#[must_use]
pub fn parse_ybegin(raw_line: &[u8]) -> YBeginFields {
    let (kv_bytes, name) = split_name_field(raw_line);
    let kv_line = String::from_utf8_lossy(kv_bytes);
    let kv = tokenize(&kv_line);
    let size = kv.get("size").and_then(|v| v.parse::<u64>().ok());
    if size.is_none() {
        warn!("{}: unparseable or out-of-range size= in {kv_line:?}", ErrorKind::InvalidSize);
    }
    if name.is_none() {
        warn!("{}: no name= field in {kv_line:?}", ErrorKind::NoFilename);
    }
    YBeginFields {
        name,
        size,
        part: kv.get("part").and_then(|v| v.parse().ok()),
        total: kv.get("total").and_then(|v| v.parse().ok()),
    }
}

/// Parses an `=ypart ` line (`begin=`, `end=`, both 1-based inclusive).
#[must_use]
pub fn parse_ypart(raw_line: &[u8]) -> YPartFields {
    let line = String::from_utf8_lossy(raw_line);
    let kv = tokenize(&line);
    YPartFields {
        begin: kv.get("begin").and_then(|v| v.parse().ok()),
        end: kv.get("end").and_then(|v| v.parse().ok()),
    }
}

/// Applies parsed `=ypart` fields to `resp`, normalizing `part_begin` to
/// 0-based and clearing all three fields on any invalid range (`begin=0`,
/// `begin>end`, or a span over [`MAX_PART_SIZE`]).
pub fn apply_ypart(fields: YPartFields, resp: &mut Response) {
    apply_ypart_to(fields, &mut resp.part_begin, &mut resp.part_end, &mut resp.part_size);
}

/// As [`apply_ypart`], but writing into bare `part_begin`/`part_end`/
/// `part_size` fields instead of a whole [`Response`] — what
/// [`crate::Decoder`] uses to update its in-progress accumulator, which
/// isn't a `Response` yet.
pub fn apply_ypart_to(fields: YPartFields, part_begin: &mut u64, part_end: &mut u64, part_size: &mut u64) {
    match (fields.begin, fields.end) {
        (Some(begin), Some(end)) if begin >= 1 && begin <= end => {
            let size = end - begin + 1;
            if size > MAX_PART_SIZE {
                warn!("{}: part span {size} exceeds {MAX_PART_SIZE}-byte cap", ErrorKind::InvalidSize);
                *part_begin = 0;
                *part_end = 0;
                *part_size = 0;
            } else {
                *part_begin = begin - 1;
                *part_end = end;
                *part_size = size;
            }
        }
        _ => {
            warn!("{}: invalid or missing begin/end on =ypart", ErrorKind::InvalidSize);
            *part_begin = 0;
            *part_end = 0;
            *part_size = 0;
        }
    }
}

/// Parses an `=yend` line (`size=`, `crc32=`, `pcrc32=`).
#[must_use]
pub fn parse_yend(raw_line: &[u8]) -> YEndFields {
    let line = String::from_utf8_lossy(raw_line);
    let kv = tokenize(&line);
    YEndFields {
        size: kv.get("size").and_then(|v| v.parse().ok()),
        crc32: kv.get("crc32").and_then(|v| parse_footer_crc(v)),
        pcrc32: kv.get("pcrc32").and_then(|v| parse_footer_crc(v)),
    }
}

/// Parses a footer CRC hex token, tolerating the historical sign-extension
/// padding some posters emit (a run of leading `f`/`F` beyond the
/// significant 8 digits). Returns `None` (not an error — see
/// [`ErrorKind::InvalidCrc`]) if the token isn't pure hex, exceeds 16 hex
/// digits, or still has more than 8 significant digits after stripping the
/// leading `f` run.
#[must_use]
pub fn parse_footer_crc(token: &str) -> Option<u32> {
    if token.is_empty() || token.len() > 16 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        debug!("{}: footer CRC token {token:?} is not 1-16 hex digits", ErrorKind::InvalidCrc);
        return None;
    }
    let significant = token.trim_start_matches(['f', 'F']);
    if significant.len() > 8 {
        debug!("{}: footer CRC token {token:?} has >8 significant hex digits", ErrorKind::InvalidCrc);
        return None;
    }
    let full = u64::from_str_radix(token, 16).ok()?;
    Some((full & 0xFFFF_FFFF) as u32)
}

/// Recognizes a uuencode `begin <mode> <name>` line, returning the file name
/// (mode is parsed but not modeled on [`Response`]).
#[must_use]
pub fn parse_uu_begin(raw_line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw_line);
    let rest = line.strip_prefix("begin ")?.trim_start();
    let (_mode, name) = rest.split_once(' ')?;
    let name = name.trim_end();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ybegin_with_spaced_name() {
        let fields = parse_ybegin(b"=ybegin part=1 total=1 line=128 size=6 name=Hi Kingdom.yenc");
        assert_eq!(fields.name.as_deref(), Some("Hi Kingdom.yenc"));
        assert_eq!(fields.size, Some(6));
        assert_eq!(fields.part, Some(1));
        assert_eq!(fields.total, Some(1));
    }

    #[test]
    fn ybegin_missing_name_is_none() {
        let fields = parse_ybegin(b"=ybegin line=128 size=6");
        assert_eq!(fields.name, None);
    }

    #[test]
    fn ypart_normalizes_begin_to_zero_based() {
        let mut resp = Response::default();
        apply_ypart(parse_ypart(b"=ypart begin=15360001 end=15744000"), &mut resp);
        assert_eq!(resp.part_begin, 15_360_000);
        assert_eq!(resp.part_end, 15_744_000);
        assert_eq!(resp.part_size, 384_000);
    }

    #[test]
    fn ypart_zeroes_on_inverted_range() {
        let mut resp = Response {
            part_begin: 1,
            part_end: 2,
            part_size: 2,
            ..Response::default()
        };
        apply_ypart(parse_ypart(b"=ypart begin=500 end=10"), &mut resp);
        assert_eq!((resp.part_begin, resp.part_end, resp.part_size), (0, 0, 0));
    }

    #[test]
    fn ypart_zeroes_when_over_cap() {
        let mut resp = Response::default();
        apply_ypart(parse_ypart(b"=ypart begin=1 end=11000000"), &mut resp);
        assert_eq!((resp.part_begin, resp.part_end, resp.part_size), (0, 0, 0));
    }

    #[test]
    fn footer_crc_plain() {
        assert_eq!(parse_footer_crc("1b851995"), Some(0x1B85_1995));
    }

    #[test]
    fn footer_crc_rejects_non_hex() {
        assert_eq!(parse_footer_crc("ZZZZZZZZ"), None);
    }

    #[test]
    fn footer_crc_rejects_excess_significant_digits() {
        assert_eq!(parse_footer_crc("ffffffff00000000abc"), None);
    }

    #[test]
    fn footer_crc_strips_sign_extension_padding() {
        assert_eq!(parse_footer_crc("fffffffa95d3e50"), Some(0xA95D_3E50));
    }

    #[test]
    fn yend_prefers_pcrc32_over_crc32() {
        let fields = parse_yend(b"=yend size=10 crc32=00000001 pcrc32=00000002");
        assert_eq!(fields.crc_expected(), Some(2));
    }

    #[test]
    fn yend_falls_back_to_crc32() {
        let fields = parse_yend(b"=yend size=10 crc32=00000001");
        assert_eq!(fields.crc_expected(), Some(1));
    }

    #[test]
    fn uu_begin_parses_name_with_spaces() {
        assert_eq!(
            parse_uu_begin(b"begin 644 my file.bin"),
            Some("my file.bin".to_string())
        );
    }
}
