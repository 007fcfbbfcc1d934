//! The decoded, render-ready view of one message file.

/// Normalized content of a single email message.
///
/// Built once per input file by the decoder and consumed once by the
/// renderer. Every header that is absent from the source is an empty
/// string, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct MessageRecord {
    /// Decoded `Subject:` (RFC 2047 encoded-words resolved).
    pub subject: String,

    /// Decoded `From:` header, as written (display name and address).
    pub from: String,

    /// Decoded `To:` header; may be empty.
    pub to: String,

    /// Decoded `Cc:` header; may be empty.
    pub cc: String,

    /// `Date:` header with its original formatting preserved.
    pub date: String,

    /// Plain-text body with `\n` line endings, trimmed.
    pub body: String,
}

impl MessageRecord {
    /// `true` if the message has no body text at all.
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}
