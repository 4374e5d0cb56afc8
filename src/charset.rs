//! Character encodings selectable by the `(*name,...)` directive.

use phf::{Map, phf_map};
use std::fmt;

/// An encoding that turns quoted text into the bytes a pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// Single byte per character, code points 0-255. The default.
    #[default]
    Iso8859_1,
    UsAscii,
    Windows1252,
    Utf8,
    Utf16Be,
    Utf16Le,
}

/// Directive names, lower case. Keep aliases next to their canonical name.
const NAME_TO_CHARSET: Map<&'static str, Charset> = phf_map! {
    "iso-8859-1" => Charset::Iso8859_1,
    "iso8859-1" => Charset::Iso8859_1,
    "latin1" => Charset::Iso8859_1,
    "latin-1" => Charset::Iso8859_1,
    "us-ascii" => Charset::UsAscii,
    "ascii" => Charset::UsAscii,
    "windows-1252" => Charset::Windows1252,
    "cp1252" => Charset::Windows1252,
    "utf-8" => Charset::Utf8,
    "utf8" => Charset::Utf8,
    "utf-16be" => Charset::Utf16Be,
    "utf16be" => Charset::Utf16Be,
    "utf-16le" => Charset::Utf16Le,
    "utf16le" => Charset::Utf16Le,
};

/// Characters windows-1252 places in 0x80-0x9F. Unassigned slots are `None`.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

impl Charset {
    /// Look up a charset by directive name, ignoring case and surrounding space.
    pub fn from_name(name: &str) -> Option<Charset> {
        NAME_TO_CHARSET
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    /// The canonical name, as accepted by [`Charset::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::UsAscii => "US-ASCII",
            Charset::Windows1252 => "windows-1252",
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf16Le => "UTF-16LE",
        }
    }

    /// Encode `text`, or `None` if some character has no representation.
    pub fn encode(&self, text: &str) -> Option<Vec<u8>> {
        match self {
            Charset::Iso8859_1 => text.chars().map(|c| u8::try_from(c).ok()).collect(),
            Charset::UsAscii => text
                .chars()
                .map(|c| c.is_ascii().then_some(c as u8))
                .collect(),
            Charset::Windows1252 => text.chars().map(windows_1252_byte).collect(),
            Charset::Utf8 => Some(text.as_bytes().to_vec()),
            Charset::Utf16Be => Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Charset::Utf16Le => Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn windows_1252_byte(ch: char) -> Option<u8> {
    match ch as u32 {
        0x00..=0x7F | 0xA0..=0xFF => Some(ch as u8),
        _ => WINDOWS_1252_HIGH
            .iter()
            .position(|&mapped| mapped == Some(ch))
            .map(|index| 0x80 + index as u8),
    }
}
