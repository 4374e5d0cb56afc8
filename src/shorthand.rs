//! Backslash shorthands for common bytes and byte classes.
//!
//! Shorthands expand to shared constant trees built once per process. The
//! upper-case letter of a class is its negation.

use phf::{Map, phf_map};
use std::sync::LazyLock;

use crate::tree::ParseTree;

pub static TAB: ParseTree = plain_byte(0x09);
pub static NEWLINE: ParseTree = plain_byte(0x0a);
pub static VERTICAL_TAB: ParseTree = plain_byte(0x0b);
pub static FORM_FEED: ParseTree = plain_byte(0x0c);
pub static CARRIAGE_RETURN: ParseTree = plain_byte(0x0d);
pub static ESCAPE: ParseTree = plain_byte(0x1b);
pub static NUL: ParseTree = plain_byte(0x00);

pub static DIGITS: ParseTree = range(b'0', b'9', false);
pub static NOT_DIGITS: ParseTree = range(b'0', b'9', true);
pub static LOWERCASE: ParseTree = range(b'a', b'z', false);
pub static NOT_LOWERCASE: ParseTree = range(b'a', b'z', true);
pub static UPPERCASE: ParseTree = range(b'A', b'Z', false);
pub static NOT_UPPERCASE: ParseTree = range(b'A', b'Z', true);
pub static ASCII: ParseTree = range(0x00, 0x7f, false);
pub static NOT_ASCII: ParseTree = range(0x00, 0x7f, true);

pub static WORD_CHARS: LazyLock<ParseTree> = LazyLock::new(|| word_chars(false));
pub static NOT_WORD_CHARS: LazyLock<ParseTree> = LazyLock::new(|| word_chars(true));
pub static WHITESPACE: LazyLock<ParseTree> = LazyLock::new(|| whitespace(false));
pub static NOT_WHITESPACE: LazyLock<ParseTree> = LazyLock::new(|| whitespace(true));

const fn plain_byte(value: u8) -> ParseTree {
    ParseTree::Byte {
        value,
        inverted: false,
    }
}

const fn range(first: u8, second: u8, inverted: bool) -> ParseTree {
    ParseTree::Range {
        first,
        second,
        inverted,
    }
}

fn word_chars(inverted: bool) -> ParseTree {
    ParseTree::Set {
        members: vec![
            DIGITS.clone(),
            UPPERCASE.clone(),
            plain_byte(b'_'),
            LOWERCASE.clone(),
        ],
        inverted,
    }
}

fn whitespace(inverted: bool) -> ParseTree {
    ParseTree::Set {
        members: vec![range(0x09, 0x0d, false), plain_byte(b' ')],
        inverted,
    }
}

/// A predefined byte class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    Digit,
    NotDigit,
    Word,
    NotWord,
    Whitespace,
    NotWhitespace,
    Lower,
    NotLower,
    Upper,
    NotUpper,
    Ascii,
    NotAscii,
}

impl ByteClass {
    pub fn negated(self) -> ByteClass {
        match self {
            ByteClass::Digit => ByteClass::NotDigit,
            ByteClass::NotDigit => ByteClass::Digit,
            ByteClass::Word => ByteClass::NotWord,
            ByteClass::NotWord => ByteClass::Word,
            ByteClass::Whitespace => ByteClass::NotWhitespace,
            ByteClass::NotWhitespace => ByteClass::Whitespace,
            ByteClass::Lower => ByteClass::NotLower,
            ByteClass::NotLower => ByteClass::Lower,
            ByteClass::Upper => ByteClass::NotUpper,
            ByteClass::NotUpper => ByteClass::Upper,
            ByteClass::Ascii => ByteClass::NotAscii,
            ByteClass::NotAscii => ByteClass::Ascii,
        }
    }

    /// The shared constant this class expands to.
    pub fn tree(self) -> &'static ParseTree {
        match self {
            ByteClass::Digit => &DIGITS,
            ByteClass::NotDigit => &NOT_DIGITS,
            ByteClass::Word => &*WORD_CHARS,
            ByteClass::NotWord => &*NOT_WORD_CHARS,
            ByteClass::Whitespace => &*WHITESPACE,
            ByteClass::NotWhitespace => &*NOT_WHITESPACE,
            ByteClass::Lower => &LOWERCASE,
            ByteClass::NotLower => &NOT_LOWERCASE,
            ByteClass::Upper => &UPPERCASE,
            ByteClass::NotUpper => &NOT_UPPERCASE,
            ByteClass::Ascii => &ASCII,
            ByteClass::NotAscii => &NOT_ASCII,
        }
    }
}

/// What a shorthand letter stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shorthand {
    /// One of the single-byte constants, such as [`TAB`].
    Byte(&'static ParseTree),
    Class(ByteClass),
}

static SHORTHANDS: Map<char, Shorthand> = phf_map! {
    '0' => Shorthand::Byte(&NUL),
    't' => Shorthand::Byte(&TAB),
    'n' => Shorthand::Byte(&NEWLINE),
    'v' => Shorthand::Byte(&VERTICAL_TAB),
    'f' => Shorthand::Byte(&FORM_FEED),
    'r' => Shorthand::Byte(&CARRIAGE_RETURN),
    'e' => Shorthand::Byte(&ESCAPE),
    'd' => Shorthand::Class(ByteClass::Digit),
    'D' => Shorthand::Class(ByteClass::NotDigit),
    'w' => Shorthand::Class(ByteClass::Word),
    'W' => Shorthand::Class(ByteClass::NotWord),
    's' => Shorthand::Class(ByteClass::Whitespace),
    'S' => Shorthand::Class(ByteClass::NotWhitespace),
    'l' => Shorthand::Class(ByteClass::Lower),
    'L' => Shorthand::Class(ByteClass::NotLower),
    'u' => Shorthand::Class(ByteClass::Upper),
    'U' => Shorthand::Class(ByteClass::NotUpper),
    'i' => Shorthand::Class(ByteClass::Ascii),
    'I' => Shorthand::Class(ByteClass::NotAscii),
};

pub fn lookup(letter: char) -> Option<Shorthand> {
    SHORTHANDS.get(&letter).copied()
}

impl Shorthand {
    /// Expand to a tree. A pending inversion yields a freshly inverted byte,
    /// or the negated class constant.
    pub fn expand(self, inverted: bool) -> ParseTree {
        match self {
            Shorthand::Byte(&ParseTree::Byte { value, .. }) if inverted => ParseTree::Byte {
                value,
                inverted: true,
            },
            Shorthand::Byte(constant) => constant.clone(),
            Shorthand::Class(class) if inverted => class.negated().tree().clone(),
            Shorthand::Class(class) => class.tree().clone(),
        }
    }
}
