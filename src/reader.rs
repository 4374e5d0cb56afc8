//! Character-level scanning of pattern text.
//!
//! The parser never indexes the text directly; everything lexical goes
//! through [`CharReader`].

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{ErrorKind, ParseError};

/// Placeholder for a nibble or bit whose value does not matter.
pub const WILDCARD: char = '_';

/// Decoded byte specification: bits set in `mask` must equal `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpec {
    pub value: u8,
    pub mask: u8,
}

impl Default for ByteSpec {
    fn default() -> Self {
        Self {
            value: 0,
            mask: 0xff,
        }
    }
}

impl ByteSpec {
    /// True if any bit position was a wildcard.
    pub fn is_wild(&self) -> bool {
        self.mask != 0xff
    }
}

/// True for characters that can open a byte specification.
pub fn starts_byte(ch: char) -> bool {
    ch.is_ascii_hexdigit() || ch == WILDCARD
}

/// A forward-only reader over pattern text that tracks how far it has read.
pub struct CharReader<'a> {
    chars: Peekable<Chars<'a>>,
    consumed: usize,
}

impl<'a> CharReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            consumed: 0,
        }
    }

    /// Consume the next character, or `None` at end of input.
    pub fn read(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.consumed += 1;
        Some(ch)
    }

    pub fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Number of characters consumed so far.
    pub fn position(&self) -> usize {
        self.consumed
    }

    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, self.consumed, message)
    }

    /// Consume up to and including `delim`, returning the text before it.
    /// Returns `None` if the input ends first.
    pub fn read_until(&mut self, delim: char) -> Option<String> {
        let mut text = String::new();
        loop {
            match self.read()? {
                c if c == delim => return Some(text),
                c => text.push(c),
            }
        }
    }

    /// Skip the rest of the current line, including its newline.
    pub fn skip_line(&mut self) {
        while let Some(c) = self.read() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Read an unsigned decimal integer.
    pub fn read_int(&mut self) -> Result<u32, ParseError> {
        let mut digits = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            digits.push(c);
            self.read();
        }
        if digits.is_empty() {
            let found = self
                .peek()
                .map_or("end of input".to_string(), |c| format!("{c:?}"));
            return Err(self.error(
                ErrorKind::ExpectedNumber,
                format!("expected a number, found {found}"),
            ));
        }
        digits.parse().map_err(|_| {
            self.error(
                ErrorKind::ExpectedNumber,
                format!("number {digits} is too large"),
            )
        })
    }

    /// Decode a byte specification whose first character, `first`, has
    /// already been consumed.
    ///
    /// Accepts a hex pair (`3f`, `3_`, `__`), a prefixed hex pair (`0x3_`)
    /// or a prefixed binary byte (`0i0011____`).
    pub fn read_byte_spec(&mut self, first: char, spec: &mut ByteSpec) -> Result<(), ParseError> {
        if first == '0' {
            match self.peek() {
                Some('x') => {
                    self.read();
                    return self.read_prefixed_hex(spec);
                }
                Some('i') => {
                    self.read();
                    return self.read_binary(spec);
                }
                _ => {}
            }
        }
        match self.read() {
            Some(second) if starts_byte(second) => {
                *spec = hex_pair(first, second);
                Ok(())
            }
            other => {
                let (kind, what) = if first == WILDCARD {
                    (ErrorKind::SplitWildcard, "wildcard")
                } else {
                    (ErrorKind::SplitHexDigit, "hex digit")
                };
                let found = other.map_or("end of input".to_string(), |c| format!("{c:?}"));
                Err(self.error(
                    kind,
                    format!("{what} {first:?} needs a second hex digit or wildcard, found {found}"),
                ))
            }
        }
    }

    fn read_prefixed_hex(&mut self, spec: &mut ByteSpec) -> Result<(), ParseError> {
        let high = self.read_spec_char(starts_byte, "hex digit or wildcard")?;
        let low = self.read_spec_char(starts_byte, "hex digit or wildcard")?;
        *spec = hex_pair(high, low);
        Ok(())
    }

    fn read_binary(&mut self, spec: &mut ByteSpec) -> Result<(), ParseError> {
        *spec = ByteSpec { value: 0, mask: 0 };
        for bit in (0..8).rev() {
            let bit_char = self.read_spec_char(
                |c| matches!(c, '0' | '1' | WILDCARD),
                "binary digit or wildcard",
            )?;
            match bit_char {
                '1' => {
                    spec.value |= 1 << bit;
                    spec.mask |= 1 << bit;
                }
                '0' => spec.mask |= 1 << bit,
                _ => {}
            }
        }
        Ok(())
    }

    fn read_spec_char(
        &mut self,
        allowed: impl Fn(char) -> bool,
        expected: &str,
    ) -> Result<char, ParseError> {
        match self.read() {
            Some(c) if allowed(c) => Ok(c),
            Some(c) => Err(self.error(
                ErrorKind::IllegalWildcardChar,
                format!("expected {expected}, found {c:?}"),
            )),
            None => Err(self.error(
                ErrorKind::IllegalWildcardChar,
                format!("expected {expected}, found end of input"),
            )),
        }
    }
}

fn hex_pair(high: char, low: char) -> ByteSpec {
    let (high_value, high_mask) = nibble(high);
    let (low_value, low_mask) = nibble(low);
    ByteSpec {
        value: (high_value << 4) | low_value,
        mask: (high_mask << 4) | low_mask,
    }
}

/// Value and mask of one hex digit or wildcard.
fn nibble(ch: char) -> (u8, u8) {
    match ch.to_digit(16) {
        Some(digit) => (digit as u8, 0x0f),
        None => (0, 0),
    }
}
