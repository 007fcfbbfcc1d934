//! Content-Transfer-Encoding decoding for message bodies and encoded words.

use std::borrow::Cow;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tracing::warn;

/// Base64 engine that tolerates missing padding and trailing bits,
/// both common in hand-made messages.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// A body transfer encoding (RFC 2045 §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    Base64,
    QuotedPrintable,
    /// `7bit`, `8bit`, `binary`, absent or unknown: bytes pass through.
    Identity,
}

impl TransferEncoding {
    /// Parse a `Content-Transfer-Encoding` header value.
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::Identity,
        }
    }

    /// Decode a body. Undecodable input is returned unchanged.
    pub fn decode(self, body: &[u8]) -> Cow<'_, [u8]> {
        match self {
            Self::Base64 => match decode_base64(body) {
                Some(bytes) => Cow::Owned(bytes),
                None => {
                    warn!("Invalid base64 body, keeping raw bytes");
                    Cow::Borrowed(body)
                }
            },
            Self::QuotedPrintable => {
                match quoted_printable::decode(body, quoted_printable::ParseMode::Robust) {
                    Ok(bytes) => Cow::Owned(bytes),
                    Err(e) => {
                        warn!(error = %e, "Invalid quoted-printable body, keeping raw bytes");
                        Cow::Borrowed(body)
                    }
                }
            }
            Self::Identity => Cow::Borrowed(body),
        }
    }
}

/// Decode base64, ignoring whitespace and line breaks anywhere in the input.
pub fn decode_base64(input: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    LENIENT_BASE64.decode(compact).ok()
}
