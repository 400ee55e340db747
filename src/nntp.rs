// SPDX-License-Identifier: MIT OR Apache-2.0
//! NNTP line protocol (component E): status line parsing and
//! classification, and dot-stuffing reversal.

/// Whether a response `code` is followed by a multi-line body, per spec.md's
/// classification table. Only article/head/body/overview replies carry one;
/// everything else (including unknown/non-numeric codes) is a bare
/// status-line response.
#[must_use]
pub fn has_multiline_body(code: u16) -> bool {
    matches!(code, 220 | 221 | 222 | 224)
}

/// Parses the leading 3-digit status code off a status line (without its
/// trailing `\r\n`). Returns `None` if the line doesn't start with exactly
/// three ASCII digits — spec.md's `MalformedStatus` condition.
#[must_use]
pub fn parse_status_code(line: &[u8]) -> Option<u16> {
    if line.len() < 3 || !line[..3].iter().all(u8::is_ascii_digit) {
        return None;
    }
    if line.len() > 3 && !line[3].is_ascii_whitespace() {
        // e.g. a 4+ digit number is not a valid NNTP status code.
        return None;
    }
    std::str::from_utf8(&line[..3]).ok()?.parse().ok()
}

/// Reverses dot-stuffing on one already-CRLF-stripped line: a line whose
/// first two bytes are `..` has its leading dot removed. Lines that are not
/// stuffed are returned unchanged.
#[must_use]
pub fn unstuff(line: &[u8]) -> &[u8] {
    if line.starts_with(b"..") {
        &line[1..]
    } else {
        line
    }
}

/// Whether `line` (CRLF-stripped, *not yet* dot-unstuffed) is the bare
/// single-dot terminator that ends a multi-line NNTP response.
#[must_use]
pub fn is_terminator(line: &[u8]) -> bool {
    line == b"."
}
