// Copyright 2025 Qcolorize (https://github.com/qcolorize)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Encoding bridge between Unicode text and the windows-1251 legacy bytes
//! the classification engine consumes.
//!
//! Code points outside the windows-1251 repertoire are carried through the
//! engine as decimal numeric character references (`&#<codepoint>;`), which
//! are pure ASCII and therefore always representable. [`encode`] and
//! [`decode`] are total: they never fail for any input.
//!
//! Caveat: [`decode`] cannot distinguish a reference produced by [`encode`]
//! from one already present in the original text, so pre-existing literal
//! `&#<digits>;` sequences are unescaped too.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Unicode characters for windows-1251 bytes 0x80..=0xFF (WHATWG
/// single-byte mapping; every byte value is defined).
const HIGH_HALF: [char; 128] = [
    '\u{0402}', '\u{0403}', '\u{201A}', '\u{0453}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{20AC}', '\u{2030}', '\u{0409}', '\u{2039}', '\u{040A}', '\u{040C}', '\u{040B}', '\u{040F}',
    '\u{0452}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{0098}', '\u{2122}', '\u{0459}', '\u{203A}', '\u{045A}', '\u{045C}', '\u{045B}', '\u{045F}',
    '\u{00A0}', '\u{040E}', '\u{045E}', '\u{0408}', '\u{00A4}', '\u{0490}', '\u{00A6}', '\u{00A7}',
    '\u{0401}', '\u{00A9}', '\u{0404}', '\u{00AB}', '\u{00AC}', '\u{00AD}', '\u{00AE}', '\u{0407}',
    '\u{00B0}', '\u{00B1}', '\u{0406}', '\u{0456}', '\u{0491}', '\u{00B5}', '\u{00B6}', '\u{00B7}',
    '\u{0451}', '\u{2116}', '\u{0454}', '\u{00BB}', '\u{0458}', '\u{0405}', '\u{0455}', '\u{0457}',
    '\u{0410}', '\u{0411}', '\u{0412}', '\u{0413}', '\u{0414}', '\u{0415}', '\u{0416}', '\u{0417}',
    '\u{0418}', '\u{0419}', '\u{041A}', '\u{041B}', '\u{041C}', '\u{041D}', '\u{041E}', '\u{041F}',
    '\u{0420}', '\u{0421}', '\u{0422}', '\u{0423}', '\u{0424}', '\u{0425}', '\u{0426}', '\u{0427}',
    '\u{0428}', '\u{0429}', '\u{042A}', '\u{042B}', '\u{042C}', '\u{042D}', '\u{042E}', '\u{042F}',
    '\u{0430}', '\u{0431}', '\u{0432}', '\u{0433}', '\u{0434}', '\u{0435}', '\u{0436}', '\u{0437}',
    '\u{0438}', '\u{0439}', '\u{043A}', '\u{043B}', '\u{043C}', '\u{043D}', '\u{043E}', '\u{043F}',
    '\u{0440}', '\u{0441}', '\u{0442}', '\u{0443}', '\u{0444}', '\u{0445}', '\u{0446}', '\u{0447}',
    '\u{0448}', '\u{0449}', '\u{044A}', '\u{044B}', '\u{044C}', '\u{044D}', '\u{044E}', '\u{044F}',
];

static TO_LEGACY: Lazy<HashMap<char, u8>> = Lazy::new(|| {
    HIGH_HALF
        .iter()
        .enumerate()
        .map(|(i, &ch)| (ch, (i + 0x80) as u8))
        .collect()
});

static NUMERIC_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#(\d+);").unwrap());

/// Whether a character is representable in windows-1251.
pub fn is_representable(ch: char) -> bool {
    ch.is_ascii() || TO_LEGACY.contains_key(&ch)
}

/// Encode Unicode text as windows-1251 bytes.
///
/// Characters outside the windows-1251 repertoire are substituted with
/// their decimal numeric character reference. Total: never fails.
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() {
            out.push(ch as u8);
        } else if let Some(&byte) = TO_LEGACY.get(&ch) {
            out.push(byte);
        } else {
            // ASCII escape, hence always representable
            out.extend_from_slice(format!("&#{};", ch as u32).as_bytes());
        }
    }
    out
}

/// Decode windows-1251 bytes to Unicode text, unescaping numeric character
/// references back to the characters they stand for.
///
/// A reference whose number is not a valid Unicode scalar value is left
/// literal. Total: never fails.
pub fn decode(bytes: &[u8]) -> String {
    unescape_numeric_refs(&legacy_to_unicode(bytes))
}

/// Byte-level windows-1251 decoding with no reference unescaping.
///
/// This is the engine-facing half of the bridge: an engine working on
/// legacy bytes must treat escape sequences as opaque literal text.
pub fn legacy_to_unicode(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for &byte in bytes {
        if byte < 0x80 {
            text.push(byte as char);
        } else {
            text.push(HIGH_HALF[(byte - 0x80) as usize]);
        }
    }
    text
}

/// Parse a numeric character reference body, if it denotes a scalar value.
pub fn reference_code_point(digits: &str) -> Option<char> {
    digits.parse::<u32>().ok().and_then(char::from_u32)
}

/// Whether the text carries numeric character references denoting
/// characters outside the windows-1251 repertoire.
///
/// This is how escaped foreign-script content looks to an engine working
/// on legacy bytes.
pub fn has_unrepresentable_references(text: &str) -> bool {
    NUMERIC_REF.captures_iter(text).any(|caps| {
        matches!(reference_code_point(&caps[1]), Some(ch) if !is_representable(ch))
    })
}

fn unescape_numeric_refs(text: &str) -> String {
    NUMERIC_REF
        .replace_all(text, |caps: &Captures<'_>| match reference_code_point(&caps[1]) {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(encode("hello <b>"), b"hello <b>");
        assert_eq!(decode(b"hello <b>"), "hello <b>");
    }

    #[test]
    fn test_cyrillic_round_trip() {
        let text = "Слабительное средство №1 — ёмко";
        assert_eq!(decode(&encode(text)), text);
    }

    #[test]
    fn test_unrepresentable_becomes_reference() {
        assert_eq!(encode("中"), b"&#20013;");
        assert_eq!(decode(b"&#20013;"), "中");
    }

    #[test]
    fn test_mixed_scripts_round_trip() {
        let text = "Аспирин 阿司匹林 aspirin";
        assert_eq!(decode(&encode(text)), text);
    }

    #[test]
    fn test_preexisting_reference_is_unescaped() {
        // Known inherited ambiguity: literal references in the original
        // input cannot be told apart from bridge-generated ones.
        assert_eq!(decode(b"price &#8364; 5"), "price \u{20AC} 5");
    }

    #[test]
    fn test_invalid_reference_stays_literal() {
        // surrogate code point
        assert_eq!(decode(b"&#55296;"), "&#55296;");
        // out of range
        assert_eq!(decode(b"&#4294967296;"), "&#4294967296;");
    }

    #[test]
    fn test_foreign_reference_detection() {
        assert!(has_unrepresentable_references("&#20013;"));
        // U+0410 is Cyrillic А, representable
        assert!(!has_unrepresentable_references("&#1040;"));
        assert!(!has_unrepresentable_references("plain text"));
    }

    #[test]
    fn test_every_legacy_byte_decodes() {
        let all: Vec<u8> = (0u8..=255).collect();
        let text = legacy_to_unicode(&all);
        assert_eq!(text.chars().count(), 256);
    }

    proptest! {
        // Digits and semicolons are excluded so the input cannot collide
        // with the reference syntax itself; every other scalar value is
        // fair game.
        #[test]
        fn prop_round_trip(
            chars in prop::collection::vec(
                prop::char::any().prop_filter("reference-syntax chars", |c| {
                    !c.is_ascii_digit() && *c != ';'
                }),
                0..64,
            )
        ) {
            let text: String = chars.into_iter().collect();
            prop_assert_eq!(decode(&encode(&text)), text);
        }
    }
}
