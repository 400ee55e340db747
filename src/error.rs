// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types.
//!
//! Per spec, malformed protocol data is *tolerated*: it surfaces as absent or
//! zeroed [`crate::Response`] fields, not as an `Err`. [`DecoderError`] is
//! reserved for the handful of conditions that are genuinely fatal to a
//! stream or a programming error by the caller.

use strum_macros::Display;

/// Fatal conditions returned by [`crate::Decoder::process`].
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum DecoderError {
    /// The caller committed more bytes than [`crate::Decoder::writable_tail`]
    /// made available.
    #[error("process({requested}) overruns the writable tail ({available} bytes available)")]
    TailOverrun {
        /// Bytes the caller claimed to have written.
        requested: usize,
        /// Bytes actually available in the tail region.
        available: usize,
    },
    /// The input buffer grew past its soft cap before a response terminator
    /// arrived.
    #[error("input buffer reached its {cap}-byte cap before a response terminator arrived")]
    BufferFull {
        /// The cap that was reached.
        cap: usize,
    },
}

/// Tolerated error kinds, used only to shape a log message at the point they
/// are encountered. None of these stop decoding; they just mean a field ends
/// up `None`/zeroed on the [`crate::Response`] being assembled.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// Status line absent or not three ASCII digits.
    MalformedStatus,
    /// `size`, `begin`, or `end` unparseable, out of range, or over the
    /// per-part cap.
    InvalidSize,
    /// Footer CRC malformed (too many significant hex digits, non-hex char).
    InvalidCrc,
    /// `=ybegin` lacked a `name=` field.
    NoFilename,
    /// Response ended before `.\r\n` arrived.
    Truncated,
}
