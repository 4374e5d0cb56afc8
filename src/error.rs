//! Errors reported by the pattern parser.

use std::fmt;

/// The condition that caused a parse to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Structural
    EmptyExpression,
    EmptyAlternatives,
    EmptySet,
    EmptyString,
    UnterminatedSet,
    UnterminatedGroup,
    UnterminatedRepeat,
    UnterminatedString,
    UnexpectedCharacter,

    // Modifier discipline
    DanglingModifier,
    ConflictingModifier,

    // Invertibility
    NotInvertible,
    UselessInversion,

    // Operand types
    InvalidRangeOperand,
    InvertedRangeBound,
    InvalidAnybitsOperand,
    NotQuantifiable,

    // Numeric and lexical
    SplitHexDigit,
    SplitWildcard,
    IllegalWildcardChar,
    ZeroRepeatNotAllowed,
    ExpectedNumber,
    UnknownCharset,
    UnencodableString,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyExpression => "empty expression",
            Self::EmptyAlternatives => "no alternatives",
            Self::EmptySet => "empty set",
            Self::EmptyString => "empty string",
            Self::UnterminatedSet => "unterminated set",
            Self::UnterminatedGroup => "unterminated group",
            Self::UnterminatedRepeat => "unterminated repeat",
            Self::UnterminatedString => "unterminated string",
            Self::UnexpectedCharacter => "unexpected character",
            Self::DanglingModifier => "modifier without a value",
            Self::ConflictingModifier => "conflicting modifiers",
            Self::NotInvertible => "value cannot be inverted",
            Self::UselessInversion => "inversion matches nothing",
            Self::InvalidRangeOperand => "invalid range operand",
            Self::InvertedRangeBound => "inverted range bound",
            Self::InvalidAnybitsOperand => "invalid any-bits operand",
            Self::NotQuantifiable => "value cannot be quantified",
            Self::SplitHexDigit => "incomplete hex byte",
            Self::SplitWildcard => "incomplete wildcard byte",
            Self::IllegalWildcardChar => "illegal character in byte",
            Self::ZeroRepeatNotAllowed => "zero repeat",
            Self::ExpectedNumber => "expected a number",
            Self::UnknownCharset => "unknown charset",
            Self::UnencodableString => "string cannot be encoded",
        };
        f.write_str(text)
    }
}

/// A failed parse: what went wrong and where.
///
/// `position` counts the characters consumed when the failure was detected,
/// which is the 1-based column of the offending character. Empty input fails
/// at position 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrorKind,
    message: String,
    position: usize,
}

impl ParseError {
    pub fn new(kind: ErrorKind, position: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at position {}: {}",
            self.kind, self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}
