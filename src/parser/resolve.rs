//! Deferred modifiers and quantifiers.
//!
//! `^`, `-` and `~` do nothing when read; they change how the next atom is
//! stored. Quantifiers rewrite the atom stored last.

use crate::error::{ErrorKind, ParseError};
use crate::tree::ParseTree;

/// The modifier waiting for the next atom of a sequence or set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Modifier {
    None,
    /// `^` read; the next atom is inverted.
    Inverted,
    /// `-` read; the next atom closes a range.
    RangeBound,
    /// `~` read; the next atom becomes an any-bits match.
    AnyBits { inverted: bool },
}

impl Modifier {
    pub fn is_pending(self) -> bool {
        self != Modifier::None
    }

    /// True if the next atom itself should carry the inversion.
    pub fn inverts_atom(self) -> bool {
        self == Modifier::Inverted
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Modifier::None => "",
            Modifier::Inverted => "^",
            Modifier::RangeBound => "-",
            Modifier::AnyBits { inverted: false } => "~",
            Modifier::AnyBits { inverted: true } => "^~",
        }
    }

    pub fn invert(self, position: usize) -> Result<Modifier, ParseError> {
        match self {
            Modifier::None => Ok(Modifier::Inverted),
            Modifier::Inverted => Err(ParseError::new(
                ErrorKind::ConflictingModifier,
                position,
                "a value cannot be inverted twice",
            )),
            Modifier::RangeBound => Err(ParseError::new(
                ErrorKind::InvertedRangeBound,
                position,
                "invert the whole range with '^' before its first byte",
            )),
            Modifier::AnyBits { .. } => Err(ParseError::new(
                ErrorKind::ConflictingModifier,
                position,
                "'^' must come before '~'",
            )),
        }
    }

    /// Start a range after `previous`, the item stored last.
    pub fn expect_range(
        self,
        previous: Option<&ParseTree>,
        position: usize,
    ) -> Result<Modifier, ParseError> {
        if self.is_pending() {
            return Err(ParseError::new(
                ErrorKind::ConflictingModifier,
                position,
                format!("'-' cannot follow '{}'", self.symbol()),
            ));
        }
        match previous {
            Some(ParseTree::Byte { .. }) => Ok(Modifier::RangeBound),
            Some(other) => Err(ParseError::new(
                ErrorKind::InvalidRangeOperand,
                position,
                format!("a range cannot start with {}", other.kind()),
            )),
            None => Err(ParseError::new(
                ErrorKind::InvalidRangeOperand,
                position,
                "'-' has no byte before it",
            )),
        }
    }

    pub fn expect_anybits(self, position: usize) -> Result<Modifier, ParseError> {
        match self {
            Modifier::None => Ok(Modifier::AnyBits { inverted: false }),
            Modifier::Inverted => Ok(Modifier::AnyBits { inverted: true }),
            other => Err(ParseError::new(
                ErrorKind::ConflictingModifier,
                position,
                format!("'~' cannot follow '{}'", other.symbol()),
            )),
        }
    }

    /// Store `atom` in `items`, combining it with earlier items as the
    /// pending modifier requires.
    pub fn apply(
        self,
        items: &mut Vec<ParseTree>,
        atom: ParseTree,
        position: usize,
    ) -> Result<(), ParseError> {
        let resolved = match self {
            Modifier::None | Modifier::Inverted => atom,
            Modifier::RangeBound => build_range(items.pop(), atom, position)?,
            Modifier::AnyBits { inverted } => build_anybits(atom, inverted, position)?,
        };
        items.push(resolved);
        Ok(())
    }
}

/// Join the byte before a `-` and the byte after it. The range takes the
/// inversion of its first byte.
fn build_range(
    first: Option<ParseTree>,
    second: ParseTree,
    position: usize,
) -> Result<ParseTree, ParseError> {
    let invalid =
        |message: String| ParseError::new(ErrorKind::InvalidRangeOperand, position, message);
    let (first, inverted) = match first {
        Some(ParseTree::Byte { value, inverted }) => (value, inverted),
        Some(other) => return Err(invalid(format!("a range cannot start with {}", other.kind()))),
        None => return Err(invalid("'-' has no byte before it".to_string())),
    };
    match second {
        ParseTree::Byte {
            inverted: true, ..
        } => Err(ParseError::new(
            ErrorKind::InvertedRangeBound,
            position,
            "the second bound of a range cannot be inverted",
        )),
        ParseTree::Byte { value, .. } => Ok(ParseTree::build_range(first, value, inverted)),
        other => Err(invalid(format!("a range cannot end with {}", other.kind()))),
    }
}

fn build_anybits(
    atom: ParseTree,
    inverted: bool,
    position: usize,
) -> Result<ParseTree, ParseError> {
    let (mask, value) = match atom {
        ParseTree::Byte { value, .. } => (0xff, value),
        ParseTree::WildBit { mask, value, .. } => (mask, value),
        other => {
            return Err(ParseError::new(
                ErrorKind::InvalidAnybitsOperand,
                position,
                format!("'~' needs a byte or wild byte, not {}", other.kind()),
            ));
        }
    };
    Ok(ParseTree::AnyBits {
        mask,
        value,
        inverted,
    })
}

/// Remove the last item so `operator` can wrap it.
pub(super) fn pop_quantifiable(
    items: &mut Vec<ParseTree>,
    operator: char,
    position: usize,
) -> Result<ParseTree, ParseError> {
    match items.pop() {
        Some(node) if node.is_quantifiable() => Ok(node),
        Some(node) => Err(ParseError::new(
            ErrorKind::NotQuantifiable,
            position,
            format!("'{operator}' cannot quantify {}", node.kind()),
        )),
        None => Err(ParseError::new(
            ErrorKind::NotQuantifiable,
            position,
            format!("'{operator}' has nothing to quantify"),
        )),
    }
}

/// Apply `?`, `*` or `+` to the last item.
pub(super) fn quantify(
    items: &mut Vec<ParseTree>,
    operator: char,
    position: usize,
) -> Result<(), ParseError> {
    let node = Box::new(pop_quantifiable(items, operator, position)?);
    items.push(match operator {
        '?' => ParseTree::Optional(node),
        '*' => ParseTree::ZeroToMany(node),
        _ => ParseTree::OneToMany(node),
    });
    Ok(())
}
