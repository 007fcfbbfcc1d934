//! Glyph coverage and metrics for the non-embedded Adobe-Japan1 CID fonts.
//!
//! Text is shown through the `UniJIS-UCS2-H` CMap, so every character is
//! written as one UTF-16BE code unit. The font dictionary declares CIDs
//! 1–632 (proportional and half-width roman, half-width katakana) with an
//! advance of 500/1000 em and everything else with the default 1000.
//! [`advance`] mirrors that table so the layout measures exactly what a
//! reader will draw.

use std::borrow::Cow;

use tracing::debug;
use unicode_width::UnicodeWidthChar;

/// Drawn in place of characters the font cannot address.
pub const PLACEHOLDER: char = '\u{3013}'; // 〓 GETA MARK

/// Character collection shared by every font we reference.
pub const REGISTRY: &str = "Adobe";
pub const ORDERING: &str = "Japan1";
pub const SUPPLEMENT: i64 = 2;

/// CMap mapping UCS-2 code units to Adobe-Japan1 CIDs.
pub const CMAP: &str = "UniJIS-UCS2-H";

/// First and last CID with a half-width advance, and that advance.
pub const HALF_WIDTH_CIDS: (i64, i64, i64) = (1, 632, 500);

/// Default CID advance in 1/1000 em.
pub const DEFAULT_WIDTH: i64 = 1000;

/// Spaces a tab expands to.
pub const TAB_WIDTH: usize = 4;

/// `true` if the character can be drawn with the `UniJIS-UCS2-H` CMap.
///
/// UCS-2 cannot address characters outside the Basic Multilingual Plane,
/// and control characters have no glyph.
pub fn is_drawable(c: char) -> bool {
    (c as u32) <= 0xFFFF && !c.is_control()
}

/// Replace undrawable characters with [`PLACEHOLDER`] and expand tabs.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| c != '\t' && is_drawable(c)) {
        return Cow::Borrowed(text);
    }

    let mut substituted = 0usize;
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.extend(std::iter::repeat(' ').take(TAB_WIDTH)),
            c if is_drawable(c) => out.push(c),
            _ => {
                substituted += 1;
                out.push(PLACEHOLDER);
            }
        }
    }
    if substituted > 0 {
        debug!(substituted, "Replaced undrawable characters with placeholder");
    }
    Cow::Owned(out)
}

/// Horizontal advance of a character in 1/1000 em.
pub fn advance(c: char) -> u16 {
    match c {
        ' '..='~' => 500,
        '\u{FF61}'..='\u{FF9F}' => 500, // half-width katakana
        _ => 1000,
    }
}

/// Width of a string in points at the given font size.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(advance(c))).sum();
    units as f32 * size / 1000.0
}

/// `true` for characters a line may break before or after (CJK and other
/// East Asian wide characters), per `unicode-width`.
pub fn is_wide(c: char) -> bool {
    c.width() == Some(2)
}

/// Encode text as UTF-16BE code units for a `UniJIS-UCS2-H` show-text string.
///
/// Call on sanitized text; anything outside the BMP is replaced.
pub fn encode_ucs2(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for c in text.chars() {
        let c = if is_drawable(c) { c } else { PLACEHOLDER };
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            out.extend_from_slice(&unit.to_be_bytes());
        }
    }
    out
}

/// Encode a PDF text string (document info) as UTF-16BE with a BOM.
pub fn encode_text_string(text: &str) -> Vec<u8> {
    let mut out = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_drawable_text_borrowed() {
        assert!(matches!(sanitize("日本語 text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_replaces_emoji_and_controls() {
        assert_eq!(sanitize("ok 😀\u{7}"), "ok \u{3013}\u{3013}");
    }

    #[test]
    fn test_sanitize_expands_tabs() {
        assert_eq!(sanitize("a\tb"), "a    b");
    }

    #[test]
    fn test_widths() {
        assert_eq!(text_width("ab", 10.0), 10.0);
        assert_eq!(text_width("日本", 10.0), 20.0);
        assert_eq!(text_width("ｱｲ", 10.0), 10.0);
    }

    #[test]
    fn test_is_wide() {
        assert!(is_wide('日'));
        assert!(is_wide('、'));
        assert!(!is_wide('a'));
        assert!(!is_wide('ｱ'));
    }

    #[test]
    fn test_encode_ucs2() {
        assert_eq!(encode_ucs2("A日"), vec![0x00, 0x41, 0x65, 0xE5]);
        assert_eq!(encode_ucs2("😀"), vec![0x30, 0x13]);
    }

    #[test]
    fn test_encode_text_string_has_bom() {
        assert_eq!(encode_text_string("A"), vec![0xFE, 0xFF, 0x00, 0x41]);
    }
}
