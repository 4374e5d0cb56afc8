//! Recursive descent parser for byte patterns.
//!
//! Grammar, informally:
//!
//! ```text
//! alternatives ::= sequence ('|' sequence)*
//! sequence     ::= (modifier* atom quantifier*)+
//! set          ::= '[' (modifier* atom)+ ']'
//! atom         ::= byte | '.' | string | shorthand | set | '(' alternatives ')'
//! ```

mod alternatives;
mod resolve;
#[cfg(test)]
mod tests;

use itertools::Itertools;

use crate::charset::Charset;
use crate::error::{ErrorKind, ParseError};
use crate::reader::{ByteSpec, CharReader, starts_byte};
use crate::shorthand;
use crate::tree::ParseTree;

use resolve::Modifier;

/// Marks a group as an encoding directive: `(*utf-8,utf-16le)`.
const CHARSET_DIRECTIVE: char = '*';

/// Parse a byte pattern into a [`ParseTree`].
///
/// Each call owns all of its state, so patterns may be parsed from any
/// number of threads at once.
pub fn parse(expression: &str) -> Result<ParseTree, ParseError> {
    if expression.is_empty() {
        return Err(ParseError::new(
            ErrorKind::EmptyExpression,
            0,
            "the expression is empty",
        ));
    }
    let mut parser = Parser::new(expression);
    match parser.parse_alternatives()? {
        (tree, End::Input) => Ok(tree),
        _ => Err(parser.reader.error(
            ErrorKind::UnexpectedCharacter,
            "')' does not close a group",
        )),
    }
}

/// What stopped a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Input,
    /// `|`: another alternative follows.
    Bar,
    /// `)`: the enclosing group is closed.
    Close,
}

struct Parser<'a> {
    reader: CharReader<'a>,
    /// Encodings for quoted strings outside sets.
    charsets: Vec<Charset>,
    byte_spec: ByteSpec,
}

impl<'a> Parser<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            reader: CharReader::new(expression),
            charsets: vec![Charset::default()],
            byte_spec: ByteSpec::default(),
        }
    }

    /// Parse `|`-separated sequences up to the end of input or a `)`.
    fn parse_alternatives(&mut self) -> Result<(ParseTree, End), ParseError> {
        let mut alternatives = Vec::new();
        let end = loop {
            let (sequence, end) = self.parse_sequence()?;
            alternatives.push(sequence);
            if end != End::Bar {
                break end;
            }
        };
        let tree = alternatives::collapse(alternatives).ok_or_else(|| {
            self.reader
                .error(ErrorKind::EmptyAlternatives, "no alternatives to match")
        })?;
        Ok((tree, end))
    }

    fn parse_sequence(&mut self) -> Result<(ParseTree, End), ParseError> {
        let mut items = Vec::new();
        let mut modifier = Modifier::None;
        let end = loop {
            let Some(ch) = self.reader.read() else {
                break End::Input;
            };
            let atom = match ch {
                '|' => break End::Bar,
                ')' => break End::Close,
                '(' if self.at_charset_directive() => {
                    self.forbid_pending(modifier, "an encoding directive")?;
                    self.parse_charset_directive()?;
                    continue;
                }
                '(' => {
                    self.check_group_operand(modifier)?;
                    self.parse_group()?
                }
                '?' | '*' | '+' => {
                    self.forbid_pending(modifier, "a quantifier")?;
                    resolve::quantify(&mut items, ch, self.reader.position())?;
                    continue;
                }
                '{' => {
                    self.forbid_pending(modifier, "a repeat")?;
                    self.parse_repeat(&mut items)?;
                    continue;
                }
                '.' if modifier.inverts_atom() => {
                    return Err(self
                        .reader
                        .error(ErrorKind::NotInvertible, "'.' cannot be inverted"));
                }
                '.' => ParseTree::Any,
                '\'' | '`' => self.parse_string(ch, modifier.inverts_atom(), false)?,
                _ => match self.parse_common(ch, &mut modifier, items.last())? {
                    Some(atom) => atom,
                    None => continue,
                },
            };
            modifier.apply(&mut items, atom, self.reader.position())?;
            modifier = Modifier::None;
        };

        let terminator = match end {
            End::Input => "the end of input",
            End::Bar => "'|'",
            End::Close => "')'",
        };
        self.forbid_pending(modifier, terminator)?;
        match items.len() {
            0 => Err(self.reader.error(
                ErrorKind::EmptyExpression,
                format!("expected a value before {terminator}"),
            )),
            1 => Ok((items.remove(0), end)),
            _ => Ok((ParseTree::Sequence(items), end)),
        }
    }

    /// Parse the members of a set; the opening `[` has been consumed.
    fn parse_set(&mut self, inverted: bool) -> Result<ParseTree, ParseError> {
        let outer_charsets = self.charsets.clone();
        let mut members = Vec::new();
        let mut modifier = Modifier::None;
        loop {
            let Some(ch) = self.reader.read() else {
                return Err(self
                    .reader
                    .error(ErrorKind::UnterminatedSet, "the set has no closing ']'"));
            };
            let atom = match ch {
                ']' => break,
                '(' if self.at_charset_directive() => {
                    self.forbid_pending(modifier, "an encoding directive")?;
                    self.parse_charset_directive()?;
                    continue;
                }
                '(' => {
                    return Err(self.reader.error(
                        ErrorKind::UnexpectedCharacter,
                        "groups are not allowed inside a set",
                    ));
                }
                '.' if modifier.inverts_atom() => {
                    return Err(self.reader.error(
                        ErrorKind::UselessInversion,
                        "an inverted '.' in a set matches nothing",
                    ));
                }
                '.' => ParseTree::Any,
                '\'' | '`' => self.parse_string(ch, modifier.inverts_atom(), true)?,
                _ => match self.parse_common(ch, &mut modifier, members.last())? {
                    Some(atom) => atom,
                    None => continue,
                },
            };
            modifier.apply(&mut members, atom, self.reader.position())?;
            modifier = Modifier::None;
        }
        self.charsets = outer_charsets;
        self.forbid_pending(modifier, "']'")?;

        let set = if inverted {
            ParseTree::build_inverted_set(members)
        } else {
            ParseTree::build_set(members)
        };
        set.ok_or_else(|| {
            self.reader
                .error(ErrorKind::EmptySet, "a set needs at least one member")
        })
    }

    /// Tokens that mean the same in sequences and sets. Returns the atom
    /// read, or `None` for tokens that produce no atom. `previous` is the
    /// item stored last, the start of any range opened here.
    fn parse_common(
        &mut self,
        ch: char,
        modifier: &mut Modifier,
        previous: Option<&ParseTree>,
    ) -> Result<Option<ParseTree>, ParseError> {
        let position = self.reader.position();
        let inverted = modifier.inverts_atom();
        match ch {
            ' ' | '\t' | '\r' | '\n' => Ok(None),
            '#' => {
                self.reader.skip_line();
                Ok(None)
            }
            '^' => {
                *modifier = modifier.invert(position)?;
                Ok(None)
            }
            '-' => {
                *modifier = modifier.expect_range(previous, position)?;
                Ok(None)
            }
            '~' => {
                *modifier = modifier.expect_anybits(position)?;
                Ok(None)
            }
            '[' => self.parse_set(inverted).map(Some),
            '\\' => self.parse_shorthand(inverted).map(Some),
            c if starts_byte(c) => self.parse_byte(c, inverted).map(Some),
            c => Err(self.reader.error(
                ErrorKind::UnexpectedCharacter,
                format!("unexpected character {c:?}"),
            )),
        }
    }

    /// Parse a bracketed group; the `(` has been consumed. An encoding
    /// directive inside the group ends with it.
    fn parse_group(&mut self) -> Result<ParseTree, ParseError> {
        let outer_charsets = self.charsets.clone();
        let (tree, end) = self.parse_alternatives()?;
        self.charsets = outer_charsets;
        if end != End::Close {
            return Err(self
                .reader
                .error(ErrorKind::UnterminatedGroup, "the group has no closing ')'"));
        }
        Ok(tree)
    }

    fn at_charset_directive(&mut self) -> bool {
        self.reader.peek() == Some(CHARSET_DIRECTIVE)
    }

    /// Parse `*name,...)` after a `(` and make those the active encodings.
    fn parse_charset_directive(&mut self) -> Result<(), ParseError> {
        self.reader.read();
        let names = self.reader.read_until(')').ok_or_else(|| {
            self.reader.error(
                ErrorKind::UnterminatedGroup,
                "the encoding directive has no closing ')'",
            )
        })?;
        let charsets: Vec<Charset> = names
            .split(',')
            .map(|name| {
                Charset::from_name(name).ok_or_else(|| {
                    self.reader.error(
                        ErrorKind::UnknownCharset,
                        format!("unknown charset {:?}", name.trim()),
                    )
                })
            })
            .collect::<Result<_, _>>()?;
        self.charsets = charsets.into_iter().unique().collect();
        Ok(())
    }

    fn parse_byte(&mut self, first: char, inverted: bool) -> Result<ParseTree, ParseError> {
        self.reader.read_byte_spec(first, &mut self.byte_spec)?;
        let ByteSpec { value, mask } = self.byte_spec;
        Ok(if self.byte_spec.is_wild() {
            ParseTree::WildBit {
                mask,
                value,
                inverted,
            }
        } else {
            ParseTree::Byte { value, inverted }
        })
    }

    fn parse_shorthand(&mut self, inverted: bool) -> Result<ParseTree, ParseError> {
        let found = match self.reader.read() {
            Some(letter) => match shorthand::lookup(letter) {
                Some(shorthand) => return Ok(shorthand.expand(inverted)),
                None => format!("unknown shorthand \\{letter}"),
            },
            None => "'\\' at the end of input".to_string(),
        };
        Err(self.reader.error(ErrorKind::UnexpectedCharacter, found))
    }

    /// Parse a quoted string; the opening quote has been consumed.
    ///
    /// A single character that encodes to one byte becomes a byte. Inside a
    /// set, strings always use the default single-byte encoding.
    fn parse_string(
        &mut self,
        quote: char,
        inverted: bool,
        in_set: bool,
    ) -> Result<ParseTree, ParseError> {
        let case_insensitive = quote == '`';
        let text = self.reader.read_until(quote).ok_or_else(|| {
            self.reader.error(
                ErrorKind::UnterminatedString,
                format!("the string has no closing {quote}"),
            )
        })?;
        if text.is_empty() {
            return Err(self
                .reader
                .error(ErrorKind::EmptyString, "strings cannot be empty"));
        }

        let charsets: &[Charset] = if in_set {
            &[Charset::Iso8859_1]
        } else {
            &self.charsets
        };
        let encodings = charsets
            .iter()
            .map(|&charset| {
                charset.encode(&text).map(|bytes| (charset, bytes)).ok_or_else(|| {
                    self.reader.error(
                        ErrorKind::UnencodableString,
                        format!("{text:?} cannot be encoded in {charset}"),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let [(_, bytes)] = encodings.as_slice()
            && !case_insensitive
            && text.chars().count() == 1
            && let [value] = bytes.as_slice()
        {
            return Ok(ParseTree::Byte {
                value: *value,
                inverted,
            });
        }
        if inverted {
            let what = if case_insensitive {
                "a case-insensitive string"
            } else {
                "a string"
            };
            return Err(self.reader.error(
                ErrorKind::NotInvertible,
                format!("{what} cannot be inverted"),
            ));
        }

        let mut strings: Vec<ParseTree> = encodings
            .into_iter()
            .map(|(charset, _)| {
                let text = text.clone();
                if case_insensitive {
                    ParseTree::CaseInsensitiveString { text, charset }
                } else {
                    ParseTree::String { text, charset }
                }
            })
            .collect();
        Ok(match strings.len() {
            1 => strings.remove(0),
            _ => ParseTree::Alternatives(strings),
        })
    }

    /// Parse `n}`, `n,m}` or `n,*}` after a `{` and wrap the last item.
    fn parse_repeat(&mut self, items: &mut Vec<ParseTree>) -> Result<(), ParseError> {
        let node = Box::new(resolve::pop_quantifiable(
            items,
            '{',
            self.reader.position(),
        )?);
        let min = self.reader.read_int()?;
        let repeat = match self.reader.read() {
            Some('}') if min == 0 => {
                return Err(self.reader.error(
                    ErrorKind::ZeroRepeatNotAllowed,
                    "a value cannot be repeated zero times",
                ));
            }
            Some('}') => ParseTree::Repeat { count: min, node },
            Some(',') if self.reader.peek() == Some('*') => {
                self.reader.read();
                self.expect_repeat_end()?;
                ParseTree::RepeatMinToMany { min, node }
            }
            Some(',') if self.reader.peek().is_some_and(|c| c.is_ascii_digit()) => {
                let max = self.reader.read_int()?;
                self.expect_repeat_end()?;
                ParseTree::RepeatMinToMax { min, max, node }
            }
            _ => return Err(self.unterminated_repeat()),
        };
        items.push(repeat);
        Ok(())
    }

    fn expect_repeat_end(&mut self) -> Result<(), ParseError> {
        match self.reader.read() {
            Some('}') => Ok(()),
            _ => Err(self.unterminated_repeat()),
        }
    }

    fn unterminated_repeat(&self) -> ParseError {
        self.reader.error(
            ErrorKind::UnterminatedRepeat,
            "expected '}', ',n}' or ',*}'",
        )
    }

    /// A modifier must be followed by the value it modifies.
    fn forbid_pending(&self, modifier: Modifier, found: &str) -> Result<(), ParseError> {
        if modifier.is_pending() {
            return Err(self.reader.error(
                ErrorKind::DanglingModifier,
                format!("'{}' must be followed by a value, not {found}", modifier.symbol()),
            ));
        }
        Ok(())
    }

    fn check_group_operand(&self, modifier: Modifier) -> Result<(), ParseError> {
        let (kind, message) = match modifier {
            Modifier::None => return Ok(()),
            Modifier::Inverted => (ErrorKind::NotInvertible, "a group cannot be inverted"),
            Modifier::RangeBound => (
                ErrorKind::InvalidRangeOperand,
                "a range bound cannot be a group",
            ),
            Modifier::AnyBits { .. } => (
                ErrorKind::InvalidAnybitsOperand,
                "'~' needs a byte or wild byte, not a group",
            ),
        };
        Err(self.reader.error(kind, message))
    }
}
