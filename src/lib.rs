//! Parser for a byte-oriented pattern language.
//!
//! [`parse`] turns pattern text into a [`ParseTree`] for byte search engines
//! to compile. Nothing here matches data.
//!
//! # Pattern syntax
//!
//! | Token            | Meaning                                            |
//! |------------------|----------------------------------------------------|
//! | `3f`             | One byte, two hex digits                           |
//! | `3_` `0x_f`      | Byte with wildcard nibbles                         |
//! | `0i0101____`     | Byte in binary, `_` for wildcard bits              |
//! | `.`              | Any byte                                           |
//! | `^X`             | Inverted byte, range, set or wild byte             |
//! | `X-Y`            | Byte range, bounds in either order                 |
//! | `~X`             | At least one bit of byte or wild byte `X` matches  |
//! | `[...]`          | Set of bytes, ranges, sets, strings                |
//! | `'text'`         | String in the active encodings                     |
//! | `` `text` ``     | Case-insensitive string                            |
//! | `(*utf-8,...)`   | Encodings for later strings in the group           |
//! | `(...)`          | Grouping                                           |
//! | `X\|Y`           | Alternation                                        |
//! | `?` `*` `+`      | Optional, zero or more, one or more                |
//! | `{n}` `{n,m}`    | Exactly n, between n and m                         |
//! | `{n,*}`          | At least n                                         |
//! | `\t` `\d` `\W`.. | Shorthand bytes and byte classes                   |
//! | `# ...`          | Comment to end of line                             |
//!
//! # Example
//!
//! ```rust
//! use bytepat::{ParseTree, parse};
//!
//! let tree = parse("00|01|02").unwrap();
//! assert_eq!(
//!     tree,
//!     ParseTree::build_set([ParseTree::byte(0), ParseTree::byte(1), ParseTree::byte(2)]).unwrap()
//! );
//! assert_eq!(parse("'GIF8' (37|39) 'a'").unwrap().to_string(), "'GIF8' [37 39] 61");
//! ```

pub mod charset;
mod error;
mod parser;
pub mod reader;
pub mod shorthand;
mod tree;

pub use charset::Charset;
pub use error::{ErrorKind, ParseError};
pub use parser::parse;
pub use tree::{NodeKind, ParseTree};
