//! Pull-based rune source with bounded lookahead.
//!
//! Bytes are read from the underlying reader in chunks only when the
//! lexer asks for more lookahead than is buffered, and decoded as
//! UTF-8 incrementally. Malformed sequences decode to U+FFFD.

use std::collections::VecDeque;
use std::io::{self, Read};

const CHUNK_SIZE: usize = 4096;

/// Why the feeder could not supply the requested lookahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exhausted {
    /// The reader reached end of input.
    Eof,
    /// The reader failed.
    Failed { kind: io::ErrorKind, message: String },
}

impl From<&io::Error> for Exhausted {
    fn from(err: &io::Error) -> Self {
        Self::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

pub struct Feeder<R> {
    reader: R,
    bytes: Vec<u8>,
    runes: VecDeque<char>,
    exhausted: Option<Exhausted>,
}

impl<R: Read> Feeder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            bytes: Vec::new(),
            runes: VecDeque::new(),
            exhausted: None,
        }
    }

    /// Buffers at least `n` runes.
    ///
    /// Returns the exhaustion cause when fewer than `n` runes are
    /// available. Whatever could be buffered stays in `buffered()`.
    pub fn at_least(&mut self, n: usize) -> Option<Exhausted> {
        while self.runes.len() < n {
            if let Some(cause) = &self.exhausted {
                return Some(cause.clone());
            }
            self.read_chunk();
        }
        None
    }

    /// Runes currently available for lookahead.
    pub fn buffered(&mut self) -> &[char] {
        self.runes.make_contiguous()
    }

    /// Consumes the next buffered rune.
    pub fn pop(&mut self) -> Option<char> {
        self.runes.pop_front()
    }

    fn read_chunk(&mut self) {
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.decode(true);
                    self.exhausted = Some(Exhausted::Eof);
                    return;
                }
                Ok(n) => {
                    self.bytes.extend_from_slice(&chunk[..n]);
                    self.decode(false);
                    return;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.exhausted = Some(Exhausted::from(&err));
                    return;
                }
            }
        }
    }

    /// Moves complete characters from `bytes` into `runes`. An
    /// incomplete trailing sequence waits for more input unless `eof`.
    fn decode(&mut self, eof: bool) {
        let mut consumed = 0;
        while consumed < self.bytes.len() {
            let rest = &self.bytes[consumed..];
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    self.runes.extend(s.chars());
                    consumed = self.bytes.len();
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.runes
                        .extend(String::from_utf8_lossy(&rest[..valid]).chars());
                    consumed += valid;
                    match err.error_len() {
                        Some(len) => {
                            self.runes.push_back(char::REPLACEMENT_CHARACTER);
                            consumed += len;
                        }
                        None if eof => {
                            self.runes.push_back(char::REPLACEMENT_CHARACTER);
                            consumed = self.bytes.len();
                        }
                        None => break,
                    }
                }
            }
        }
        self.bytes.drain(..consumed);
    }
}
