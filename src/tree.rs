//! The syntax tree produced by the pattern parser.

use itertools::Itertools;
use std::fmt;

use crate::charset::Charset;

/// One node of a parsed byte pattern.
///
/// Trees are built once by [`crate::parse`] and never modified afterwards;
/// every child is owned by exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTree {
    /// A single byte value.
    Byte { value: u8, inverted: bool },
    /// An inclusive byte range. Bounds are kept in the order they were
    /// written; either order denotes the same bytes.
    Range {
        first: u8,
        second: u8,
        inverted: bool,
    },
    /// Any byte matching one of the members.
    Set {
        members: Vec<ParseTree>,
        inverted: bool,
    },
    /// Every byte value.
    Any,
    /// A byte where only the bits in `mask` must equal `value`.
    WildBit { mask: u8, value: u8, inverted: bool },
    /// A byte where at least one bit in `mask` equals the same bit of `value`.
    AnyBits { mask: u8, value: u8, inverted: bool },
    String { text: String, charset: Charset },
    CaseInsensitiveString { text: String, charset: Charset },
    /// Two or more nodes matched one after another.
    Sequence(Vec<ParseTree>),
    /// Two or more nodes, any one of which matches.
    Alternatives(Vec<ParseTree>),
    Optional(Box<ParseTree>),
    ZeroToMany(Box<ParseTree>),
    OneToMany(Box<ParseTree>),
    Repeat {
        count: u32,
        node: Box<ParseTree>,
    },
    /// `min` and `max` are unordered; `{5,2}` is as valid as `{2,5}`.
    RepeatMinToMax {
        min: u32,
        max: u32,
        node: Box<ParseTree>,
    },
    RepeatMinToMany {
        min: u32,
        node: Box<ParseTree>,
    },
}

/// The variant of a [`ParseTree`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Byte,
    Range,
    Set,
    Any,
    WildBit,
    AnyBits,
    String,
    CaseInsensitiveString,
    Sequence,
    Alternatives,
    Optional,
    ZeroToMany,
    OneToMany,
    Repeat,
    RepeatMinToMax,
    RepeatMinToMany,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Byte => "BYTE",
            NodeKind::Range => "RANGE",
            NodeKind::Set => "SET",
            NodeKind::Any => "ANY",
            NodeKind::WildBit => "WILDBIT",
            NodeKind::AnyBits => "ANYBITS",
            NodeKind::String => "STRING",
            NodeKind::CaseInsensitiveString => "CASE_INSENSITIVE_STRING",
            NodeKind::Sequence => "SEQUENCE",
            NodeKind::Alternatives => "ALTERNATIVES",
            NodeKind::Optional => "OPTIONAL",
            NodeKind::ZeroToMany => "ZERO_TO_MANY",
            NodeKind::OneToMany => "ONE_TO_MANY",
            NodeKind::Repeat => "REPEAT",
            NodeKind::RepeatMinToMax => "REPEAT_MIN_TO_MAX",
            NodeKind::RepeatMinToMany => "REPEAT_MIN_TO_MANY",
        };
        f.write_str(name)
    }
}

impl ParseTree {
    pub fn byte(value: u8) -> ParseTree {
        ParseTree::Byte {
            value,
            inverted: false,
        }
    }

    pub fn build_range(first: u8, second: u8, inverted: bool) -> ParseTree {
        ParseTree::Range {
            first,
            second,
            inverted,
        }
    }

    /// Build a set from `nodes`, or `None` if there are none.
    pub fn build_set(nodes: impl IntoIterator<Item = ParseTree>) -> Option<ParseTree> {
        Self::set_of(nodes, false)
    }

    /// Build an inverted set from `nodes`, or `None` if there are none.
    pub fn build_inverted_set(nodes: impl IntoIterator<Item = ParseTree>) -> Option<ParseTree> {
        Self::set_of(nodes, true)
    }

    fn set_of(nodes: impl IntoIterator<Item = ParseTree>, inverted: bool) -> Option<ParseTree> {
        let members: Vec<ParseTree> = nodes.into_iter().collect();
        (!members.is_empty()).then_some(ParseTree::Set { members, inverted })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ParseTree::Byte { .. } => NodeKind::Byte,
            ParseTree::Range { .. } => NodeKind::Range,
            ParseTree::Set { .. } => NodeKind::Set,
            ParseTree::Any => NodeKind::Any,
            ParseTree::WildBit { .. } => NodeKind::WildBit,
            ParseTree::AnyBits { .. } => NodeKind::AnyBits,
            ParseTree::String { .. } => NodeKind::String,
            ParseTree::CaseInsensitiveString { .. } => NodeKind::CaseInsensitiveString,
            ParseTree::Sequence(_) => NodeKind::Sequence,
            ParseTree::Alternatives(_) => NodeKind::Alternatives,
            ParseTree::Optional(_) => NodeKind::Optional,
            ParseTree::ZeroToMany(_) => NodeKind::ZeroToMany,
            ParseTree::OneToMany(_) => NodeKind::OneToMany,
            ParseTree::Repeat { .. } => NodeKind::Repeat,
            ParseTree::RepeatMinToMax { .. } => NodeKind::RepeatMinToMax,
            ParseTree::RepeatMinToMany { .. } => NodeKind::RepeatMinToMany,
        }
    }

    pub fn is_inverted(&self) -> bool {
        match self {
            ParseTree::Byte { inverted, .. }
            | ParseTree::Range { inverted, .. }
            | ParseTree::Set { inverted, .. }
            | ParseTree::WildBit { inverted, .. }
            | ParseTree::AnyBits { inverted, .. } => *inverted,
            _ => false,
        }
    }

    /// True if the node may be the child of a quantifier.
    pub fn is_quantifiable(&self) -> bool {
        !matches!(
            self,
            ParseTree::Optional(_)
                | ParseTree::ZeroToMany(_)
                | ParseTree::OneToMany(_)
                | ParseTree::Repeat { .. }
                | ParseTree::RepeatMinToMax { .. }
                | ParseTree::RepeatMinToMany { .. }
        )
    }

    /// True if the node always matches exactly one byte position, so it can
    /// become a member of a set.
    pub fn matches_single_position(&self) -> bool {
        matches!(
            self,
            ParseTree::Byte { .. }
                | ParseTree::Range { .. }
                | ParseTree::Set { .. }
                | ParseTree::Any
                | ParseTree::WildBit { .. }
        )
    }

    /// Direct children: set members, sequence or alternative elements, or
    /// the single quantified node.
    pub fn children(&self) -> &[ParseTree] {
        match self {
            ParseTree::Set { members: nodes, .. }
            | ParseTree::Sequence(nodes)
            | ParseTree::Alternatives(nodes) => nodes,
            ParseTree::Optional(node)
            | ParseTree::ZeroToMany(node)
            | ParseTree::OneToMany(node)
            | ParseTree::Repeat { node, .. }
            | ParseTree::RepeatMinToMax { node, .. }
            | ParseTree::RepeatMinToMany { node, .. } => std::slice::from_ref(node.as_ref()),
            _ => &[],
        }
    }

    /// Render a node that sits inside a sequence, alternation or quantifier,
    /// bracketing it when its own structure would otherwise be absorbed.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, bracket_sequences: bool) -> fmt::Result {
        match self {
            ParseTree::Alternatives(_) => write!(f, "({self})"),
            ParseTree::Sequence(_) if bracket_sequences => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

fn fmt_quantified(f: &mut fmt::Formatter<'_>, node: &ParseTree, suffix: &str) -> fmt::Result {
    node.fmt_nested(f, true)?;
    f.write_str(suffix)
}

fn fmt_inversion(f: &mut fmt::Formatter<'_>, inverted: bool) -> fmt::Result {
    if inverted { f.write_str("^") } else { Ok(()) }
}

/// Hex pair with `_` for masked nibbles when the mask is nibble aligned,
/// otherwise the `0i` binary form with `_` for masked bits.
fn fmt_wild_byte(f: &mut fmt::Formatter<'_>, mask: u8, value: u8) -> fmt::Result {
    let nibble_aligned = [mask >> 4, mask & 0x0f]
        .iter()
        .all(|&nibble| nibble == 0 || nibble == 0x0f);
    if nibble_aligned {
        for shift in [4, 0] {
            if (mask >> shift) & 0x0f == 0 {
                f.write_str("_")?;
            } else {
                write!(f, "{:x}", (value >> shift) & 0x0f)?;
            }
        }
        Ok(())
    } else {
        f.write_str("0i")?;
        for bit in (0..8).rev() {
            let digit = if mask & (1 << bit) == 0 {
                '_'
            } else if value & (1 << bit) == 0 {
                '0'
            } else {
                '1'
            };
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

/// Renders the tree in pattern syntax. Re-parsing the output gives back an
/// equal tree when all strings use the default charset.
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTree::Byte { value, inverted } => {
                fmt_inversion(f, *inverted)?;
                write!(f, "{value:02x}")
            }
            ParseTree::Range {
                first,
                second,
                inverted,
            } => {
                fmt_inversion(f, *inverted)?;
                write!(f, "{first:02x}-{second:02x}")
            }
            ParseTree::Set { members, inverted } => {
                fmt_inversion(f, *inverted)?;
                write!(f, "[{}]", members.iter().join(" "))
            }
            ParseTree::Any => f.write_str("."),
            ParseTree::WildBit {
                mask,
                value,
                inverted,
            } => {
                fmt_inversion(f, *inverted)?;
                fmt_wild_byte(f, *mask, *value)
            }
            ParseTree::AnyBits {
                mask,
                value,
                inverted,
            } => {
                fmt_inversion(f, *inverted)?;
                f.write_str("~")?;
                if *mask == 0xff {
                    write!(f, "{value:02x}")
                } else {
                    fmt_wild_byte(f, *mask, *value)
                }
            }
            ParseTree::String { text, .. } => write!(f, "'{text}'"),
            ParseTree::CaseInsensitiveString { text, .. } => write!(f, "`{text}`"),
            ParseTree::Sequence(nodes) => {
                for (index, node) in nodes.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    node.fmt_nested(f, true)?;
                }
                Ok(())
            }
            ParseTree::Alternatives(nodes) => {
                for (index, node) in nodes.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    node.fmt_nested(f, false)?;
                }
                Ok(())
            }
            ParseTree::Optional(node) => fmt_quantified(f, node, "?"),
            ParseTree::ZeroToMany(node) => fmt_quantified(f, node, "*"),
            ParseTree::OneToMany(node) => fmt_quantified(f, node, "+"),
            ParseTree::Repeat { count, node } => {
                fmt_quantified(f, node, &format!("{{{count}}}"))
            }
            ParseTree::RepeatMinToMax { min, max, node } => {
                fmt_quantified(f, node, &format!("{{{min},{max}}}"))
            }
            ParseTree::RepeatMinToMany { min, node } => {
                fmt_quantified(f, node, &format!("{{{min},*}}"))
            }
        }
    }
}
