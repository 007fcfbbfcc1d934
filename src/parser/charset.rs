//! Byte-to-text conversion with an ordered charset fallback chain.
//!
//! Every conversion walks a list of [`Attempt`]s and keeps the first one
//! that decodes the bytes without errors. The last attempt is always a
//! lossy UTF-8 decode, so the chain cannot fail.
//!
//! Chain for a declared, known charset:
//! `declared → UTF-8 → ISO-2022-JP → EUC-JP → Shift_JIS → UTF-8 lossy`.
//!
//! Chain when no charset is declared: the same without the first step.
//!
//! `us-ascii` is checked as 7-bit text rather than mapped to the WHATWG
//! windows-1252 superset, so mislabeled 8-bit bodies still reach UTF-8
//! and the Japanese charsets. Western single-byte labels (`iso-8859-1`,
//! `windows-1252`) accept every byte, so they only get UTF-8 in front:
//! `UTF-8 → windows-1252`.
//!
//! Chain for a declared but unknown charset label:
//! `UTF-8 → UTF-8 lossy`. Unknown labels are never guessed as a legacy
//! charset; undecodable bytes become U+FFFD.

use std::borrow::Cow;

use encoding_rs::{Encoding, EUC_JP, ISO_2022_JP, SHIFT_JIS, UTF_8, WINDOWS_1252};
use tracing::{debug, warn};

/// Legacy charsets tried after UTF-8 when the declared one fails.
///
/// EUC-JP goes before Shift_JIS: most EUC-JP byte pairs are also valid
/// half-width katakana in Shift_JIS, while the reverse rarely holds.
const LEGACY_FALLBACKS: [&Encoding; 3] = [ISO_2022_JP, EUC_JP, SHIFT_JIS];

/// Labels for plain 7-bit ASCII (RFC 2046 §4.1.2 and the IANA aliases).
const ASCII_LABELS: [&str; 5] = ["us-ascii", "ascii", "us", "ansi_x3.4-1968", "iso646-us"];

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attempt {
    /// Strict decode with a specific encoding.
    Strict(&'static Encoding),
    /// Strict 7-bit ASCII.
    Ascii,
    /// UTF-8 with U+FFFD for every malformed sequence. Never fails.
    Lossy,
}

impl Attempt {
    /// Try this step; `None` means "move on to the next one".
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Strict(encoding) if encoding == UTF_8 => {
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            Self::Strict(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(Cow::into_owned),
            Self::Ascii => bytes
                .is_ascii()
                .then(|| String::from_utf8_lossy(bytes).into_owned()),
            Self::Lossy => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

fn normalize_label(label: &str) -> &str {
    let label = label.trim().trim_matches('"');
    label.split('*').next().unwrap_or(label)
}

/// `true` for the `us-ascii` family of labels.
pub fn is_ascii_label(label: &str) -> bool {
    let label = normalize_label(label);
    ASCII_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label))
}

/// Resolve a MIME charset label (`"Shift_JIS"`, `"utf8"`, `"x-sjis"`…).
///
/// RFC 2231 language suffixes (`"utf-8*ja"`) and surrounding quotes are
/// ignored. Returns `None` for labels `encoding_rs` does not know.
pub fn lookup(label: &str) -> Option<&'static Encoding> {
    let label = normalize_label(label);
    match label.to_ascii_lowercase().as_str() {
        "utf8" => Some(UTF_8),
        // Common aliases missing from the WHATWG label table.
        "cp932" | "ms932" | "windows-31j" | "sjis" => Some(SHIFT_JIS),
        "eucjp" => Some(EUC_JP),
        _ => Encoding::for_label(label.as_bytes()),
    }
}

/// Build the ordered list of attempts for an optional declared charset.
pub fn fallback_chain(declared: Option<&str>) -> Vec<Attempt> {
    let mut chain = Vec::with_capacity(6);

    match declared.map(str::trim).filter(|label| !label.is_empty()) {
        Some(label) if is_ascii_label(label) => {
            chain.push(Attempt::Ascii);
            push_defaults(&mut chain);
        }
        Some(label) => match lookup(label) {
            Some(encoding) if encoding == WINDOWS_1252 => {
                chain.push(Attempt::Strict(UTF_8));
                chain.push(Attempt::Strict(WINDOWS_1252));
            }
            Some(encoding) => {
                chain.push(Attempt::Strict(encoding));
                push_defaults(&mut chain);
            }
            None => {
                warn!(
                    charset = label,
                    "Unsupported charset, decoding as UTF-8 with substitution"
                );
                chain.push(Attempt::Strict(UTF_8));
            }
        },
        None => push_defaults(&mut chain),
    }

    chain.push(Attempt::Lossy);
    chain.dedup();
    chain
}

fn push_defaults(chain: &mut Vec<Attempt>) {
    chain.push(Attempt::Strict(UTF_8));
    chain.extend(LEGACY_FALLBACKS.iter().map(|&e| Attempt::Strict(e)));
}

/// Decode `bytes` using the first attempt of the chain that succeeds.
pub fn decode_text(declared: Option<&str>, bytes: &[u8]) -> String {
    for attempt in fallback_chain(declared) {
        if let Some(text) = attempt.decode(bytes) {
            if attempt == Attempt::Lossy && !bytes.is_empty() {
                debug!(
                    declared = declared.unwrap_or(""),
                    "No charset decoded cleanly, substituted invalid bytes"
                );
            }
            return text;
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}
