use super::*;
use crate::shorthand::{DIGITS, NOT_WORD_CHARS, TAB, WHITESPACE};
use crate::tree::NodeKind;

fn parse_ok(s: &str) -> ParseTree {
    parse(s).unwrap_or_else(|err| panic!("parse of {s:?} should succeed: {err}"))
}

fn parse_err(s: &str) -> ErrorKind {
    parse(s).expect_err("parse should fail").kind()
}

fn byte(value: u8) -> ParseTree {
    ParseTree::byte(value)
}

fn inverted(value: u8) -> ParseTree {
    ParseTree::Byte {
        value,
        inverted: true,
    }
}

fn set(members: Vec<ParseTree>) -> ParseTree {
    ParseTree::build_set(members).unwrap()
}

fn text(s: &str, charset: Charset) -> ParseTree {
    ParseTree::String {
        text: s.to_string(),
        charset,
    }
}

// --- Bytes ---

#[test]
fn test_every_byte_value() {
    for value in 0..=255u8 {
        assert_eq!(parse_ok(&format!("{value:02x}")), byte(value));
        assert_eq!(parse_ok(&format!("{value:02X}")), byte(value));
        assert_eq!(parse_ok(&format!("^{value:02x}")), inverted(value));
    }
}

#[test]
fn test_wild_bytes() {
    assert_eq!(
        parse_ok("4_"),
        ParseTree::WildBit {
            mask: 0xf0,
            value: 0x40,
            inverted: false
        }
    );
    assert_eq!(
        parse_ok("^0i1_______"),
        ParseTree::WildBit {
            mask: 0x80,
            value: 0x80,
            inverted: true
        }
    );
    assert_eq!(parse_ok("0x7f"), byte(0x7f));
    assert_eq!(parse_ok("0i01000001"), byte(0x41));
}

#[test]
fn test_split_bytes() {
    assert_eq!(parse_err("0"), ErrorKind::SplitHexDigit);
    assert_eq!(parse_err("01 2"), ErrorKind::SplitHexDigit);
    assert_eq!(parse_err("_ "), ErrorKind::SplitWildcard);
    assert_eq!(parse_err("0i0120"), ErrorKind::IllegalWildcardChar);
}

#[test]
fn test_any() {
    assert_eq!(parse_ok("."), ParseTree::Any);
    assert_eq!(parse_err("^."), ErrorKind::NotInvertible);
}

// --- Whitespace and comments ---

#[test]
fn test_whitespace_and_comments_are_ignored() {
    let expected = ParseTree::Sequence(vec![byte(1), byte(2)]);
    assert_eq!(parse_ok("01 02"), expected);
    assert_eq!(parse_ok("0102"), expected);
    assert_eq!(parse_ok("01 #c\n02"), expected);
    assert_eq!(parse_ok("\t01\r\n02 # trailing"), expected);
}

#[test]
fn test_empty_expressions() {
    assert_eq!(parse_err(""), ErrorKind::EmptyExpression);
    assert_eq!(parse_err("   "), ErrorKind::EmptyExpression);
    assert_eq!(parse_err("# only a comment"), ErrorKind::EmptyExpression);
    assert_eq!(parse_err("01|"), ErrorKind::EmptyExpression);
    assert_eq!(parse_err("()"), ErrorKind::EmptyExpression);
}

#[test]
fn test_empty_input_fails_at_position_zero() {
    assert_eq!(parse("").unwrap_err().position(), 0);
}

// --- Ranges ---

#[test]
fn test_range_keeps_written_order() {
    assert_eq!(parse_ok("01-02"), ParseTree::build_range(1, 2, false));
    assert_eq!(parse_ok("02-01"), ParseTree::build_range(2, 1, false));
    assert_eq!(parse_ok("01 - 02"), ParseTree::build_range(1, 2, false));
}

#[test]
fn test_inverted_range() {
    assert_eq!(parse_ok("^01-02"), ParseTree::build_range(1, 2, true));
    assert_eq!(parse_err("01-^02"), ErrorKind::InvertedRangeBound);
}

#[test]
fn test_range_from_strings_and_shorthands() {
    assert_eq!(parse_ok("'a'-'z'"), ParseTree::build_range(0x61, 0x7a, false));
    assert_eq!(parse_ok("\\t-\\r"), ParseTree::build_range(0x09, 0x0d, false));
}

#[test]
fn test_range_operands() {
    assert_eq!(parse_err("-01"), ErrorKind::InvalidRangeOperand);
    assert_eq!(parse_err(".-01"), ErrorKind::InvalidRangeOperand);
    assert_eq!(parse_err("01-."), ErrorKind::InvalidRangeOperand);
    assert_eq!(parse_err("01-'ab'"), ErrorKind::InvalidRangeOperand);
    assert_eq!(parse_err("01-(02)"), ErrorKind::InvalidRangeOperand);
    assert_eq!(parse_err("0_-ff"), ErrorKind::InvalidRangeOperand);
}

#[test]
fn test_dash_needs_a_preceding_byte() {
    for pattern in ["-", "01|-", "-^01", "-~01", "[-01]", "(-01)"] {
        assert_eq!(
            parse_err(pattern),
            ErrorKind::InvalidRangeOperand,
            "{pattern:?}"
        );
    }
    assert_eq!(parse("-01").unwrap_err().position(), 1);
    assert_eq!(parse("01|-").unwrap_err().position(), 4);
    assert_eq!(parse(". -01").unwrap_err().position(), 3);
    assert_eq!(parse_ok("01 -02"), ParseTree::build_range(1, 2, false));
}

#[test]
fn test_range_in_sequence() {
    assert_eq!(
        parse_ok("00 01-02 03"),
        ParseTree::Sequence(vec![byte(0), ParseTree::build_range(1, 2, false), byte(3)])
    );
}

// --- Any bits ---

#[test]
fn test_anybits() {
    assert_eq!(
        parse_ok("~0f"),
        ParseTree::AnyBits {
            mask: 0xff,
            value: 0x0f,
            inverted: false
        }
    );
    assert_eq!(
        parse_ok("^~f_"),
        ParseTree::AnyBits {
            mask: 0xf0,
            value: 0xf0,
            inverted: true
        }
    );
    assert_eq!(parse_err("~."), ErrorKind::InvalidAnybitsOperand);
    assert_eq!(parse_err("~[01]"), ErrorKind::InvalidAnybitsOperand);
    assert_eq!(parse_err("~(01)"), ErrorKind::InvalidAnybitsOperand);
}

// --- Modifier discipline ---

#[test]
fn test_dangling_modifiers() {
    assert_eq!(parse_err("01-"), ErrorKind::DanglingModifier);
    assert_eq!(parse_err("^"), ErrorKind::DanglingModifier);
    assert_eq!(parse_err("~"), ErrorKind::DanglingModifier);
    assert_eq!(parse_err("^|01"), ErrorKind::DanglingModifier);
    assert_eq!(parse_err("01 ^*"), ErrorKind::DanglingModifier);
    assert_eq!(parse_err("[01 ^]"), ErrorKind::DanglingModifier);
}

#[test]
fn test_conflicting_modifiers() {
    assert_eq!(parse_err("^^01"), ErrorKind::ConflictingModifier);
    assert_eq!(parse_err("~^01"), ErrorKind::ConflictingModifier);
    assert_eq!(parse_err("01-~02"), ErrorKind::ConflictingModifier);
    assert_eq!(parse_err("01--02"), ErrorKind::ConflictingModifier);
}

#[test]
fn test_inverted_group_is_rejected() {
    assert_eq!(parse_err("^(01 02)"), ErrorKind::NotInvertible);
}

// --- Sets ---

#[test]
fn test_set() {
    assert_eq!(parse_ok("[01 02 03]"), set(vec![byte(1), byte(2), byte(3)]));
    assert_eq!(
        parse_ok("^[01 02]"),
        ParseTree::build_inverted_set([byte(1), byte(2)]).unwrap()
    );
}

#[test]
fn test_single_member_set_is_kept() {
    assert_eq!(parse_ok("[01]"), set(vec![byte(1)]));
    assert_eq!(
        parse_ok("['ab']"),
        set(vec![text("ab", Charset::Iso8859_1)])
    );
}

#[test]
fn test_set_errors() {
    assert_eq!(parse_err("[]"), ErrorKind::EmptySet);
    assert_eq!(parse_err("[ # nothing\n]"), ErrorKind::EmptySet);
    assert_eq!(parse_err("[01 02 03"), ErrorKind::UnterminatedSet);
    assert_eq!(parse_err("[01 (02)]"), ErrorKind::UnexpectedCharacter);
    assert_eq!(parse_err("[01|02]"), ErrorKind::UnexpectedCharacter);
    assert_eq!(parse_err("[01*]"), ErrorKind::UnexpectedCharacter);
    assert_eq!(parse_err("[01{2}]"), ErrorKind::UnexpectedCharacter);
    assert_eq!(parse_err("01]"), ErrorKind::UnexpectedCharacter);
}

#[test]
fn test_nested_sets_keep_their_inversion() {
    assert_eq!(
        parse_ok("[01 02 [03 04]]"),
        set(vec![byte(1), byte(2), set(vec![byte(3), byte(4)])])
    );
    let tree = parse_ok("[01 02 ^[03 04]]");
    assert!(!tree.is_inverted());
    assert_eq!(
        tree.children()[2],
        ParseTree::build_inverted_set([byte(3), byte(4)]).unwrap()
    );
}

#[test]
fn test_set_members() {
    assert_eq!(
        parse_ok("[^01 02-05 ~0f . \\d]"),
        set(vec![
            inverted(1),
            ParseTree::build_range(2, 5, false),
            ParseTree::AnyBits {
                mask: 0xff,
                value: 0x0f,
                inverted: false
            },
            ParseTree::Any,
            DIGITS.clone(),
        ])
    );
    assert_eq!(parse_err("[^.]"), ErrorKind::UselessInversion);
}

#[test]
fn test_set_strings_use_single_byte_encoding() {
    assert_eq!(
        parse_ok("(*utf-16le)['a' 'bc']"),
        set(vec![byte(0x61), text("bc", Charset::Iso8859_1)])
    );
    assert_eq!(parse_ok("[^'a']"), set(vec![inverted(0x61)]));
    assert_eq!(parse_err("[^'ab']"), ErrorKind::NotInvertible);
    assert_eq!(parse_err("['\u{20ac}']"), ErrorKind::UnencodableString);
}

// --- Strings ---

#[test]
fn test_single_character_string_is_a_byte() {
    assert_eq!(parse_ok("'A'"), byte(0x41));
    assert_eq!(parse_ok("^'A'"), inverted(0x41));
}

#[test]
fn test_strings() {
    assert_eq!(parse_ok("'GIF89a'"), text("GIF89a", Charset::Iso8859_1));
    assert_eq!(parse_err("^'ab'"), ErrorKind::NotInvertible);
    assert_eq!(parse_err("''"), ErrorKind::EmptyString);
    assert_eq!(parse_err("'abc"), ErrorKind::UnterminatedString);
}

#[test]
fn test_case_insensitive_strings() {
    assert_eq!(
        parse_ok("`a`"),
        ParseTree::CaseInsensitiveString {
            text: "a".to_string(),
            charset: Charset::Iso8859_1
        }
    );
    assert_eq!(parse_err("^`a`"), ErrorKind::NotInvertible);
    assert_eq!(parse_err("`abc"), ErrorKind::UnterminatedString);
}

#[test]
fn test_multi_byte_single_character_is_a_string() {
    assert_eq!(parse_ok("(*utf-16be)'a'"), text("a", Charset::Utf16Be));
    assert_eq!(parse_err("(*utf-16be)^'a'"), ErrorKind::NotInvertible);
    assert_eq!(parse_ok("(*utf-8)'a'"), byte(0x61));
}

// --- Encoding directives ---

#[test]
fn test_multiple_encodings_fan_out() {
    assert_eq!(
        parse_ok("(*utf-8, UTF-16LE)'hi'"),
        ParseTree::Alternatives(vec![
            text("hi", Charset::Utf8),
            text("hi", Charset::Utf16Le),
        ])
    );
    assert_eq!(
        parse_ok("(*ascii,latin1)`x`"),
        ParseTree::Alternatives(vec![
            ParseTree::CaseInsensitiveString {
                text: "x".to_string(),
                charset: Charset::UsAscii
            },
            ParseTree::CaseInsensitiveString {
                text: "x".to_string(),
                charset: Charset::Iso8859_1
            },
        ])
    );
}

#[test]
fn test_duplicate_encodings_are_dropped() {
    assert_eq!(parse_ok("(*utf-8,utf8)'hi'"), text("hi", Charset::Utf8));
}

#[test]
fn test_encoding_directive_is_scoped_to_its_group() {
    assert_eq!(
        parse_ok("((*utf-16le)'ab') 'cd'"),
        ParseTree::Sequence(vec![
            text("ab", Charset::Utf16Le),
            text("cd", Charset::Iso8859_1),
        ])
    );
    assert_eq!(
        parse_ok("(*utf-8)('ab') 'cd'"),
        ParseTree::Sequence(vec![text("ab", Charset::Utf8), text("cd", Charset::Utf8)])
    );
}

#[test]
fn test_encoding_directive_carries_across_bars() {
    assert_eq!(
        parse_ok("(*utf-8)'ab'|'cd'"),
        ParseTree::Alternatives(vec![text("ab", Charset::Utf8), text("cd", Charset::Utf8)])
    );
    assert_eq!(
        parse_ok("((*utf-16le)'ab'|'cd') 'ef'"),
        ParseTree::Sequence(vec![
            ParseTree::Alternatives(vec![
                text("ab", Charset::Utf16Le),
                text("cd", Charset::Utf16Le),
            ]),
            text("ef", Charset::Iso8859_1),
        ])
    );
}

#[test]
fn test_encoding_directive_errors() {
    assert_eq!(parse_err("(*ebcdic)'a'"), ErrorKind::UnknownCharset);
    assert_eq!(parse_err("(*)'a'"), ErrorKind::UnknownCharset);
    assert_eq!(parse_err("(*utf-8"), ErrorKind::UnterminatedGroup);
    assert_eq!(parse_err("(*ascii)'\u{e9}'"), ErrorKind::UnencodableString);
    assert_eq!(parse_err("^(*utf-8)'a'"), ErrorKind::DanglingModifier);
    assert_eq!(parse_err("(*utf-8)"), ErrorKind::EmptyExpression);
}

// --- Shorthands ---

#[test]
fn test_shorthands() {
    assert_eq!(parse_ok("\\t"), TAB.clone());
    assert_eq!(parse_ok("^\\t"), inverted(0x09));
    assert_eq!(parse_ok("\\d"), DIGITS.clone());
    assert_eq!(parse_ok("^\\w"), NOT_WORD_CHARS.clone());
    assert_eq!(parse_ok("\\W"), NOT_WORD_CHARS.clone());
    assert_eq!(parse_ok("\\s"), WHITESPACE.clone());
    assert_eq!(parse_err("\\q"), ErrorKind::UnexpectedCharacter);
    assert_eq!(parse_err("01 \\"), ErrorKind::UnexpectedCharacter);
}

// --- Quantifiers ---

#[test]
fn test_quantifiers() {
    assert_eq!(parse_ok("01?"), ParseTree::Optional(Box::new(byte(1))));
    assert_eq!(parse_ok("01*"), ParseTree::ZeroToMany(Box::new(byte(1))));
    assert_eq!(
        parse_ok("00 01+"),
        ParseTree::Sequence(vec![byte(0), ParseTree::OneToMany(Box::new(byte(1)))])
    );
    assert_eq!(
        parse_ok("(01 02)*"),
        ParseTree::ZeroToMany(Box::new(ParseTree::Sequence(vec![byte(1), byte(2)])))
    );
    assert_eq!(
        parse_ok("'ab'+"),
        ParseTree::OneToMany(Box::new(text("ab", Charset::Iso8859_1)))
    );
}

#[test]
fn test_quantifier_without_operand() {
    assert_eq!(parse_err("*"), ErrorKind::NotQuantifiable);
    assert_eq!(parse_err("?"), ErrorKind::NotQuantifiable);
    assert_eq!(parse_err("+"), ErrorKind::NotQuantifiable);
    assert_eq!(parse_err("01|*"), ErrorKind::NotQuantifiable);
}

#[test]
fn test_quantifiers_do_not_stack() {
    assert_eq!(parse_err("01**"), ErrorKind::NotQuantifiable);
    assert_eq!(parse_err("01?+"), ErrorKind::NotQuantifiable);
    assert_eq!(parse_err("01{2}{3}"), ErrorKind::NotQuantifiable);
}

#[test]
fn test_repeats() {
    assert_eq!(
        parse_ok("01{3}"),
        ParseTree::Repeat {
            count: 3,
            node: Box::new(byte(1))
        }
    );
    assert_eq!(
        parse_ok("01{2,5}"),
        ParseTree::RepeatMinToMax {
            min: 2,
            max: 5,
            node: Box::new(byte(1))
        }
    );
    assert_eq!(
        parse_ok("01{5,2}"),
        ParseTree::RepeatMinToMax {
            min: 5,
            max: 2,
            node: Box::new(byte(1))
        }
    );
    assert_eq!(
        parse_ok("01{0,*}"),
        ParseTree::RepeatMinToMany {
            min: 0,
            node: Box::new(byte(1))
        }
    );
}

#[test]
fn test_repeat_errors() {
    assert_eq!(parse_err("01{0}"), ErrorKind::ZeroRepeatNotAllowed);
    assert_eq!(parse_err("01{3"), ErrorKind::UnterminatedRepeat);
    assert_eq!(parse_err("01{3,}"), ErrorKind::UnterminatedRepeat);
    assert_eq!(parse_err("01{3,*"), ErrorKind::UnterminatedRepeat);
    assert_eq!(parse_err("01{3;4}"), ErrorKind::UnterminatedRepeat);
    assert_eq!(parse_err("01{}"), ErrorKind::ExpectedNumber);
    assert_eq!(parse_err("{3}"), ErrorKind::NotQuantifiable);
}

// --- Groups and alternatives ---

#[test]
fn test_group_is_not_wrapped() {
    assert_eq!(parse_ok("(01)"), byte(1));
    assert_eq!(
        parse_ok("00 (01 02) 03"),
        ParseTree::Sequence(vec![
            byte(0),
            ParseTree::Sequence(vec![byte(1), byte(2)]),
            byte(3),
        ])
    );
}

#[test]
fn test_group_errors() {
    assert_eq!(parse_err("(01"), ErrorKind::UnterminatedGroup);
    assert_eq!(parse_err("((01)"), ErrorKind::UnterminatedGroup);
    assert_eq!(parse_err("01)"), ErrorKind::UnexpectedCharacter);
    assert_eq!(parse_err("(01))02"), ErrorKind::UnexpectedCharacter);
}

#[test]
fn test_single_byte_alternatives_become_a_set() {
    assert_eq!(parse_ok("00|01|02"), set(vec![byte(0), byte(1), byte(2)]));
    assert_eq!(parse_ok("(00|01)"), set(vec![byte(0), byte(1)]));
}

#[test]
fn test_single_byte_alternative_alone_is_not_merged() {
    let tree = parse_ok("00|deadff|7f7f80ff");
    assert_eq!(
        tree,
        ParseTree::Alternatives(vec![
            byte(0),
            ParseTree::Sequence(vec![byte(0xde), byte(0xad), byte(0xff)]),
            ParseTree::Sequence(vec![byte(0x7f), byte(0x7f), byte(0x80), byte(0xff)]),
        ])
    );
}

#[test]
fn test_mixed_alternatives_keep_structured_members() {
    let tree = parse_ok("00|dead|01-05|[10 11]|0_");
    assert_eq!(
        tree,
        ParseTree::Alternatives(vec![
            ParseTree::Sequence(vec![byte(0xde), byte(0xad)]),
            set(vec![
                byte(0),
                ParseTree::build_range(1, 5, false),
                set(vec![byte(0x10), byte(0x11)]),
                ParseTree::WildBit {
                    mask: 0xf0,
                    value: 0x00,
                    inverted: false
                },
            ]),
        ])
    );
}

#[test]
fn test_anybits_alternatives_are_not_merged() {
    assert_eq!(parse_ok("~01|~02").kind(), NodeKind::Alternatives);
}

// --- Error positions ---

#[test]
fn test_error_positions() {
    let err = parse("01 zz").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedCharacter);
    assert_eq!(err.position(), 4);
    assert_eq!(parse("[01 02").unwrap_err().position(), 6);
}

// --- Whole trees ---

#[test]
fn test_tree_invariants_hold() {
    fn check(tree: &ParseTree) {
        match tree {
            ParseTree::Sequence(nodes) | ParseTree::Alternatives(nodes) => {
                assert!(nodes.len() >= 2, "{tree:?} has fewer than two children")
            }
            ParseTree::Set { members, .. } => assert!(!members.is_empty()),
            ParseTree::Repeat { count, .. } => assert!(*count >= 1),
            _ => {}
        }
        if !tree.is_quantifiable() {
            assert!(tree.children()[0].is_quantifiable());
        }
        tree.children().iter().for_each(check);
    }
    for pattern in [
        "'PK' 03 04 (14|0a) 00{2,*} [01-7f ^80]",
        "(00|01|02)+ (.|ff ff)? ^~3_ `mz`",
        "((01 02)|(03))* \\d{4} ^\\s",
    ] {
        check(&parse_ok(pattern));
    }
}

#[test]
fn test_rendering_round_trips() {
    for pattern in [
        "01 02 03",
        "^01-02 [03 ^04 ~0_]",
        "(01 02 | 03 04) 05+",
        "'GIF8' (37|39) 'a'",
        "`abc`? 0i1_0_____ . {2}",
        "(de ad | be ef){2,*} 00{1,3}",
        "[\\d \\W] ^[.]",
    ] {
        let tree = parse_ok(pattern);
        let rendered = tree.to_string();
        assert_eq!(parse_ok(&rendered), tree, "{pattern:?} rendered as {rendered:?}");
    }
}

#[test]
fn test_concurrent_parses() {
    let handles: Vec<_> = (0..8u8)
        .map(|i| std::thread::spawn(move || parse(&format!("{i:02x} (*utf-8)'x' \\w"))))
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let tree = handle.join().unwrap().unwrap();
        assert_eq!(tree.children()[0], byte(i as u8));
    }
}
