// SPDX-License-Identifier: MIT OR Apache-2.0
//! Streaming response decoder (component F): owns the input buffer window,
//! drives nntp → header → (yenc | uu) → crc32, and yields completed
//! [`Response`]s.

use log::{debug, trace, warn};

use crate::error::{DecoderError, ErrorKind};
use crate::header;
use crate::nntp;
use crate::response::{Format, Response};
use crate::uu;
use crate::yenc::YencDecoder;

/// Soft cap on the input buffer (spec.md §5): a stream that never produces a
/// response terminator within this many buffered bytes is considered stuck.
const DEFAULT_BUFFER_CAP: usize = 16 * 1024 * 1024;

/// Where the decoder is within one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Waiting for the status line.
    AwaitStatus,
    /// Status line seen, body expected; scanning lines for `=ybegin`/`begin`
    /// vs. plain informational text, up to the `.` terminator.
    AwaitHeaders,
    /// `=ybegin`/uu `begin` seen; decoding payload lines of the given
    /// format, up to `.`.
    InPayload(Format),
}

/// Accumulator for the response currently being assembled.
#[derive(Default)]
struct InProgress {
    status_code: u16,
    lines: Vec<String>,
    format: Format,
    file_name: Option<String>,
    file_size: u64,
    part_begin: u64,
    part_end: u64,
    part_size: u64,
    part_locked_invalid: bool,
    crc_expected: Option<u32>,
    data: Vec<u8>,
    crc_state: u32,
    yenc: YencDecoder,
    footer_seen: bool,
}

impl InProgress {
    fn reset(&mut self) {
        *self = InProgress {
            crc_state: crate::crc32::INITIAL_STATE,
            ..InProgress::default()
        };
    }

    fn finish(&mut self) -> Response {
        let bytes_decoded = self.bytes_decoded();
        let resp = Response {
            status_code: self.status_code,
            lines: (!self.lines.is_empty()).then(|| std::mem::take(&mut self.lines)),
            data: matches!(self.format, Format::YEnc | Format::Uu)
                .then(|| std::mem::take(&mut self.data)),
            format: self.format,
            file_name: self.file_name.take(),
            file_size: self.file_size,
            part_begin: self.part_begin,
            part_end: self.part_end,
            part_size: self.part_size,
            crc_computed: matches!(self.format, Format::YEnc | Format::Uu)
                .then(|| crate::crc32::finalize(self.crc_state)),
            crc_expected: self.crc_expected,
            bytes_decoded,
        };
        if let Some(computed) = resp.crc_computed {
            trace!(
                "status {} complete: format={} bytes={} crc_computed={} crc_expected={}",
                resp.status_code,
                resp.format,
                resp.bytes_decoded,
                hex::encode(computed.to_be_bytes()),
                resp.crc_expected.map_or_else(|| "none".to_string(), |c| hex::encode(c.to_be_bytes())),
            );
        }
        self.reset();
        resp
    }

    fn bytes_decoded(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Owns the unconsumed wire bytes for one NNTP stream and drives the
/// response-parsing state machine over them.
///
/// One `Decoder` per stream; it performs no I/O itself. Callers write
/// network bytes into [`Decoder::writable_tail`] and call
/// [`Decoder::process`] to advance parsing and collect any responses that
/// completed as a result.
pub struct Decoder {
    buf: Vec<u8>,
    read_pos: usize,
    tail_start: usize,
    cap: usize,
    state: ParserState,
    current: InProgress,
}

impl Decoder {
    /// Creates a decoder with a starting buffer allocation of `capacity_hint`
    /// bytes and the default 16 MiB soft cap.
    #[must_use]
    pub fn new(capacity_hint: usize) -> Self {
        Self::with_cap(capacity_hint, DEFAULT_BUFFER_CAP)
    }

    /// As [`Decoder::new`], with an explicit soft cap instead of the 16 MiB
    /// default.
    #[must_use]
    pub fn with_cap(capacity_hint: usize, cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity_hint),
            read_pos: 0,
            tail_start: 0,
            cap,
            state: ParserState::AwaitStatus,
            current: InProgress {
                crc_state: crate::crc32::INITIAL_STATE,
                ..InProgress::default()
            },
        }
    }

    /// Returns a mutable region of at least `hint` bytes for the caller to
    /// fill with freshly read network bytes, then pass the number actually
    /// written to [`Decoder::process`].
    ///
    /// Calling this again before `process` truncates `buf` back to the
    /// previously committed length first, so the never-committed region
    /// from the earlier call is discarded rather than spliced permanently
    /// into the wire stream. Only one `writable_tail`/`process` pair is
    /// meant to be in flight at a time.
    pub fn writable_tail(&mut self, hint: usize) -> &mut [u8] {
        self.buf.truncate(self.tail_start);
        self.compact();
        self.tail_start = self.buf.len();
        let target = self.tail_start + hint.max(4096);
        self.buf.resize(target, 0);
        &mut self.buf[self.tail_start..]
    }

    /// Commits `n` bytes written into the region returned by
    /// [`Decoder::writable_tail`] and advances parsing as far as it can go.
    ///
    /// Returns every [`Response`] that completed during this call, in wire
    /// order. `process(0)` is legal and simply re-attempts parsing over
    /// already-buffered bytes (e.g. after the caller decides not to append
    /// more just yet).
    ///
    /// # Errors
    ///
    /// * [`DecoderError::TailOverrun`] if `n` exceeds what `writable_tail`
    ///   made available.
    /// * [`DecoderError::BufferFull`] if the soft cap is reached before a
    ///   response terminator arrives.
    pub fn process(&mut self, n: usize) -> Result<std::vec::IntoIter<Response>, DecoderError> {
        let available = self.buf.len() - self.tail_start;
        if n > available {
            return Err(DecoderError::TailOverrun {
                requested: n,
                available,
            });
        }
        self.buf.truncate(self.tail_start + n);
        self.tail_start = self.buf.len();

        let mut completed = Vec::new();
        loop {
            match self.step()? {
                StepResult::Progress => {}
                StepResult::NeedMoreData => break,
                StepResult::Completed(resp) => completed.push(resp),
            }
        }
        Ok(completed.into_iter())
    }

    /// Consumes the decoder, returning any bytes still buffered but not yet
    /// forming a complete response.
    #[must_use]
    pub fn into_pending(self) -> Vec<u8> {
        let mut buf = self.buf;
        buf.drain(0..self.read_pos);
        buf
    }

    /// Drops the already-consumed prefix of the buffer so it doesn't grow
    /// without bound across many responses.
    fn compact(&mut self) {
        if self.read_pos == 0 {
            return;
        }
        self.buf.drain(0..self.read_pos);
        self.tail_start = self.tail_start.saturating_sub(self.read_pos);
        self.read_pos = 0;
    }

    /// Finds the next `\r\n`-terminated line in the unconsumed region,
    /// without consuming it. Returns the line (excluding the CRLF) and the
    /// position just past the CRLF.
    fn peek_line(&self) -> Option<(&[u8], usize)> {
        let unconsumed = &self.buf[self.read_pos..];
        let pos = unconsumed.windows(2).position(|w| w == b"\r\n")?;
        Some((&unconsumed[..pos], self.read_pos + pos + 2))
    }

    fn step(&mut self) -> Result<StepResult, DecoderError> {
        let Some((line, next_read_pos)) = self.peek_line() else {
            let pending = self.buf.len() - self.read_pos;
            if pending > self.cap {
                return Err(DecoderError::BufferFull { cap: self.cap });
            }
            if pending > 0 {
                trace!("{}: {pending} bytes buffered with no line terminator yet", ErrorKind::Truncated);
            }
            return Ok(StepResult::NeedMoreData);
        };
        let line = line.to_vec();
        self.read_pos = next_read_pos;

        match self.state {
            ParserState::AwaitStatus => Ok(self.handle_status_line(&line)),
            ParserState::AwaitHeaders | ParserState::InPayload(_) => {
                Ok(self.handle_body_line(&line))
            }
        }
    }

    fn handle_status_line(&mut self, line: &[u8]) -> StepResult {
        let Some(code) = nntp::parse_status_code(line) else {
            warn!("{}: status line {:?} is not three ASCII digits", ErrorKind::MalformedStatus, String::from_utf8_lossy(line));
            self.current.status_code = 0;
            return StepResult::Completed(self.current.finish());
        };
        if nntp::has_multiline_body(code) {
            trace!("status {code} expects a multi-line body");
            self.current.status_code = code;
            self.state = ParserState::AwaitHeaders;
            StepResult::Progress
        } else {
            self.current.status_code = code;
            self.state = ParserState::AwaitStatus;
            StepResult::Completed(self.current.finish())
        }
    }

    fn handle_body_line(&mut self, raw_line: &[u8]) -> StepResult {
        if nntp::is_terminator(raw_line) {
            self.state = ParserState::AwaitStatus;
            return StepResult::Completed(self.current.finish());
        }
        let line = nntp::unstuff(raw_line);

        match self.state {
            ParserState::AwaitHeaders => {
                if line.starts_with(b"=ybegin ") {
                    self.start_yenc(line);
                } else if let Some(name) = header::parse_uu_begin(line) {
                    self.current.file_name = Some(name);
                    self.current.format = Format::Uu;
                    self.state = ParserState::InPayload(Format::Uu);
                } else {
                    self.current
                        .lines
                        .push(String::from_utf8_lossy(line).into_owned());
                }
            }
            ParserState::InPayload(Format::YEnc) => self.feed_yenc_line(line),
            ParserState::InPayload(Format::Uu) => self.feed_uu_line(line),
            ParserState::InPayload(Format::None) => unreachable!("payload state is always YEnc or Uu"),
        }
        StepResult::Progress
    }

    fn start_yenc(&mut self, line: &[u8]) {
        let fields = header::parse_ybegin(line);
        self.current.file_name = fields.name;
        match fields.size {
            Some(size) => self.current.file_size = size,
            None => {
                self.current.file_size = 0;
                self.current.part_locked_invalid = true;
            }
        }
        self.current.format = Format::YEnc;
        self.state = ParserState::InPayload(Format::YEnc);
    }

    fn feed_yenc_line(&mut self, line: &[u8]) {
        if self.current.footer_seen {
            return;
        }
        if line.starts_with(b"=ypart ") {
            if !self.current.part_locked_invalid {
                let fields = header::parse_ypart(line);
                header::apply_ypart_to(
                    fields,
                    &mut self.current.part_begin,
                    &mut self.current.part_end,
                    &mut self.current.part_size,
                );
            }
            return;
        }
        if line.starts_with(b"=yend") {
            let fields = header::parse_yend(line);
            self.current.crc_expected = fields.crc_expected();
            if fields.crc_expected().is_none() {
                debug!("{}: no usable CRC in =yend footer", ErrorKind::InvalidCrc);
            }
            self.current.footer_seen = true;
            return;
        }
        self.current.yenc.decode_chunk(
            line,
            &mut self.current.data,
            &mut self.current.crc_state,
        );
    }

    fn feed_uu_line(&mut self, line: &[u8]) {
        if self.current.footer_seen {
            return;
        }
        if line == b"end" {
            self.current.footer_seen = true;
            return;
        }
        uu::decode_line(line, &mut self.current.data, &mut self.current.crc_state);
    }
}

enum StepResult {
    Progress,
    NeedMoreData,
    Completed(Response),
}
