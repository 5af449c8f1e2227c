//! Generation-I text codec.
//!
//! In-ROM text is a fixed 8-bit character set, not ASCII: upper and
//! lower case live at 0x80-0xBF, digits at 0xF6-0xFF, and the ranges in
//! between hold dialogue control codes (rendered here as `{...}`
//! markers), ligature glyphs (`'d`, `'s`, ...), and a mirrored copy of
//! part of the alphabet at 0x60-0x7F. Strings end at the 0x50
//! terminator, not at 0x00.

use std::sync::LazyLock;

/// Byte value marking the end of an in-ROM string.
pub const TERMINATOR: u8 = 0x50;

/// Byte → glyph table. Empty entries are unmapped (or genuinely empty)
/// byte values.
#[rustfmt::skip]
pub static TABLE: [&str; 256] = {
    let mut t = [""; 256];

    // Dialogue control codes.
    t[0x49] = "{page+}";
    t[0x4b] = "{_cont}";
    t[0x4c] = "{autocont}";
    t[0x4e] = "{line+}";
    t[0x4f] = "{line++}"; // move to bottom line
    t[0x50] = "{end}";
    t[0x51] = "{para}";
    t[0x55] = "{+cont}";
    t[0x57] = "{done}";
    t[0x58] = "{$prompt}";
    t[0x5f] = "{dex-}";

    // Variable substitution codes.
    t[0x52] = "{player}";
    t[0x53] = "{rival}";
    t[0x59] = "{target}";
    t[0x5a] = "{user}";

    // Always this text.
    t[0x54] = "POKé";

    // 0x60-0x7F: mirror characters.
    t[0x60] = "A"; t[0x61] = "B"; t[0x62] = "C"; t[0x63] = "D";
    t[0x64] = "E"; t[0x65] = "F"; t[0x66] = "G"; t[0x67] = "H";
    t[0x68] = "I"; t[0x69] = "V"; t[0x6a] = "S"; t[0x6b] = "L";
    t[0x6c] = "M"; t[0x6d] = ":"; t[0x6e] = "ぃ"; t[0x6f] = "ぅ";
    t[0x70] = "‘"; t[0x71] = "’"; t[0x72] = "“"; t[0x73] = "”";
    t[0x74] = "・"; t[0x75] = "⋯"; t[0x76] = "ぁ"; t[0x77] = "ぇ";
    t[0x78] = "ぉ"; t[0x7f] = " ";

    // 0x80-0xBF: the ordinary alphabet.
    t[0x80] = "A"; t[0x81] = "B"; t[0x82] = "C"; t[0x83] = "D";
    t[0x84] = "E"; t[0x85] = "F"; t[0x86] = "G"; t[0x87] = "H";
    t[0x88] = "I"; t[0x89] = "J"; t[0x8a] = "K"; t[0x8b] = "L";
    t[0x8c] = "M"; t[0x8d] = "N"; t[0x8e] = "O"; t[0x8f] = "P";
    t[0x90] = "Q"; t[0x91] = "R"; t[0x92] = "S"; t[0x93] = "T";
    t[0x94] = "U"; t[0x95] = "V"; t[0x96] = "W"; t[0x97] = "X";
    t[0x98] = "Y"; t[0x99] = "Z"; t[0x9a] = "("; t[0x9b] = ")";
    t[0x9c] = ":"; t[0x9d] = ";"; t[0x9e] = "["; t[0x9f] = "]";
    t[0xa0] = "a"; t[0xa1] = "b"; t[0xa2] = "c"; t[0xa3] = "d";
    t[0xa4] = "e"; t[0xa5] = "f"; t[0xa6] = "g"; t[0xa7] = "h";
    t[0xa8] = "i"; t[0xa9] = "j"; t[0xaa] = "k"; t[0xab] = "l";
    t[0xac] = "m"; t[0xad] = "n"; t[0xae] = "o"; t[0xaf] = "p";
    t[0xb0] = "q"; t[0xb1] = "r"; t[0xb2] = "s"; t[0xb3] = "t";
    t[0xb4] = "u"; t[0xb5] = "v"; t[0xb6] = "w"; t[0xb7] = "x";
    t[0xb8] = "y"; t[0xb9] = "z"; t[0xba] = "é"; t[0xbb] = "'d";
    t[0xbc] = "'l"; t[0xbd] = "'s"; t[0xbe] = "'t"; t[0xbf] = "'v";

    // 0xE0-0xFF: punctuation, symbols, digits.
    t[0xe0] = "'";  t[0xe1] = "PK"; t[0xe2] = "MN"; t[0xe3] = "-";
    t[0xe4] = "'r"; t[0xe5] = "'m"; t[0xe6] = "?";  t[0xe7] = "!";
    t[0xe8] = ".";  t[0xe9] = "ァ"; t[0xea] = "ゥ"; t[0xeb] = "ェ";
    t[0xec] = "▷"; t[0xed] = "▶"; t[0xee] = "▼"; t[0xef] = "♂";
    t[0xf0] = "¥";  t[0xf1] = "×"; t[0xf2] = ".";  t[0xf3] = "/";
    t[0xf4] = ",";  t[0xf5] = "♀";
    t[0xf6] = "0"; t[0xf7] = "1"; t[0xf8] = "2"; t[0xf9] = "3";
    t[0xfa] = "4"; t[0xfb] = "5"; t[0xfc] = "6"; t[0xfd] = "7";
    t[0xfe] = "8"; t[0xff] = "9";

    t
};

/// Encode-side index over [`TABLE`]: the mapped entries sorted longest
/// glyph first, ties broken toward the numerically highest byte, so a
/// forward search finds the preferred match without rescanning the
/// table per input position.
static ENCODE_INDEX: LazyLock<Vec<(u8, &'static str)>> = LazyLock::new(|| {
    let mut entries: Vec<(u8, &'static str)> = TABLE
        .iter()
        .enumerate()
        .filter(|(_, glyph)| !glyph.is_empty())
        .map(|(b, glyph)| (b as u8, *glyph))
        .collect();
    entries.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(b.0.cmp(&a.0)));
    entries
});

/// Whether `b` has a (non-empty) glyph in the table.
#[must_use]
pub fn is_mapped(b: u8) -> bool {
    !TABLE[usize::from(b)].is_empty()
}

/// Whether `b` is an ordinary letter or digit, as opposed to a control
/// code, punctuation, or an unmapped byte.
#[must_use]
pub fn is_text(b: u8) -> bool {
    (0x80..=0xbf).contains(&b) || (0xf6..=0xff).contains(&b)
}

/// Decode a byte sequence until the terminator or an unmapped byte.
/// The stopping byte is never emitted.
pub fn decode<I: IntoIterator<Item = u8>>(bytes: I) -> String {
    let mut out = String::new();
    for b in bytes {
        if b == TERMINATOR {
            break;
        }
        let glyph = TABLE[usize::from(b)];
        if glyph.is_empty() {
            break;
        }
        out.push_str(glyph);
    }
    out
}

/// Result of [`encode`]: the ROM bytes plus a count of input characters
/// that had no table entry and were dropped behind the emitted
/// terminator.
#[derive(Debug, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub unencodable: usize,
}

/// Encode a string into ROM bytes.
///
/// At each position the table entry with the longest glyph string
/// prefix-matching the remaining input wins; among equally long
/// matches, the numerically highest byte value wins (so `"A"` encodes
/// to 0x80, not its 0x60 mirror). When no entry matches, the terminator
/// is emitted, the remaining characters are counted as unencodable, and
/// encoding stops.
#[must_use]
pub fn encode(text: &str) -> Encoded {
    let mut bytes = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let hit = ENCODE_INDEX
            .iter()
            .find(|(_, glyph)| rest.starts_with(glyph));

        match hit {
            Some(&(b, glyph)) => {
                bytes.push(b);
                rest = &rest[glyph.len()..];
            }
            None => {
                bytes.push(TERMINATOR);
                return Encoded {
                    bytes,
                    unencodable: rest.chars().count(),
                };
            }
        }
    }

    Encoded {
        bytes,
        unencodable: 0,
    }
}

/// Encode a single character for fixed-width slot filling: the first
/// table entry (ascending byte order) whose glyph starts with `c`, or
/// the terminator when none does.
///
/// Note the ascending scan makes `'P'` hit 0x54 (`POKé`) before the
/// plain letter at 0x8F; [`encode`]'s longest-match rule does not share
/// this quirk.
#[must_use]
pub fn encode_char(c: char) -> u8 {
    for (b, glyph) in TABLE.iter().enumerate() {
        if glyph.starts_with(c) {
            return b as u8;
        }
    }
    TERMINATOR
}
