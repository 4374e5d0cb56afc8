//! Collapsing of alternatives that each match one byte position.
//!
//! `00|01|7f-80` is a single set-membership test, so such alternatives are
//! merged into one set. Members keep their own structure; resolving the
//! final byte membership is left to whoever compiles the tree.

use crate::tree::ParseTree;

/// Combine the branches of an alternation into one tree, or `None` if there
/// are no branches.
pub(super) fn collapse(alternatives: Vec<ParseTree>) -> Option<ParseTree> {
    let mut alternatives = merge_single_positions(alternatives);
    match alternatives.len() {
        0 | 1 => alternatives.pop(),
        _ => Some(ParseTree::Alternatives(alternatives)),
    }
}

/// Move two or more single-position branches into one set, placed after the
/// remaining branches.
fn merge_single_positions(alternatives: Vec<ParseTree>) -> Vec<ParseTree> {
    let single = alternatives
        .iter()
        .filter(|node| node.matches_single_position())
        .count();
    if single < 2 {
        return alternatives;
    }
    let (members, mut remaining): (Vec<_>, Vec<_>) = alternatives
        .into_iter()
        .partition(ParseTree::matches_single_position);
    remaining.push(ParseTree::Set {
        members,
        inverted: false,
    });
    remaining
}
