//! Decoder for individual `.eml` files (RFC 5322 messages, optionally MIME).

use std::path::Path;

use crate::error::{ConvertError, DecodeError};
use crate::model::message::MessageRecord;
use crate::parser::{header, mime};

/// Read and decode a single `.eml` file.
///
/// The file is read in one go and closed before decoding starts.
pub fn read_message(path: impl AsRef<Path>) -> crate::error::Result<MessageRecord> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| ConvertError::unreadable(path, e))?;

    decode_message(&data).map_err(|source| ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode raw message bytes into a [`MessageRecord`].
///
/// Fails only if the bytes are not a message at all. Bad charsets and bad
/// transfer encodings degrade to substitution instead of failing.
pub fn decode_message(raw: &[u8]) -> Result<MessageRecord, DecodeError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }

    let message_bytes = header::strip_envelope(raw);
    let (head, _) = header::split_header_body(message_bytes);
    let headers = header::unfold_headers(&header::decode_header_bytes(head));
    if headers.is_empty() {
        return Err(DecodeError::NotAMessage);
    }

    let field = |name: &str| {
        header::get_header(&headers, name)
            .map(header::decode_encoded_words)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let body = mime::extract_body(message_bytes).unwrap_or_default();

    Ok(MessageRecord {
        subject: field("subject"),
        from: field("from"),
        to: field("to"),
        cc: field("cc"),
        date: header::get_header(&headers, "date")
            .unwrap_or_default()
            .to_string(),
        body: normalize_body(&body),
    })
}

/// Normalize line endings to `\n`, drop trailing spaces on each line and
/// trim leading/trailing blank lines.
fn normalize_body(body: &str) -> String {
    let unified = body.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = unified.lines().map(str::trim_end).collect();
    lines.join("\n").trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_headers_verbatim() {
        let raw = b"From: Alice <alice@example.com>\r\n\
To: bob@example.com\r\n\
Cc: carol@example.com, dave@example.com\r\n\
Subject: Plain subject (no encoding)\r\n\
Date: Thu, 04 Jan 2024 10:00:00 +0900\r\n\
\r\n\
Hello Bob.\r\n";
        let record = decode_message(raw).unwrap();
        assert_eq!(record.from, "Alice <alice@example.com>");
        assert_eq!(record.to, "bob@example.com");
        assert_eq!(record.cc, "carol@example.com, dave@example.com");
        assert_eq!(record.subject, "Plain subject (no encoding)");
        assert_eq!(record.date, "Thu, 04 Jan 2024 10:00:00 +0900");
        assert_eq!(record.body, "Hello Bob.");
    }

    #[test]
    fn test_missing_headers_are_empty() {
        let record = decode_message(b"X-Mailer: test\n\nbody").unwrap();
        assert_eq!(record.subject, "");
        assert_eq!(record.from, "");
        assert_eq!(record.to, "");
        assert_eq!(record.cc, "");
        assert_eq!(record.date, "");
        assert_eq!(record.body, "body");
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(decode_message(b""), Err(DecodeError::Empty));
        assert_eq!(decode_message(b"\r\n \n"), Err(DecodeError::Empty));
    }

    #[test]
    fn test_not_a_message_fails() {
        assert_eq!(
            decode_message(b"just some words\nwithout any header\n"),
            Err(DecodeError::NotAMessage)
        );
    }

    #[test]
    fn test_raw_utf8_body_without_charset() {
        let raw = "Subject: test\n\nこんにちは、世界\n".as_bytes();
        let record = decode_message(raw).unwrap();
        assert_eq!(record.body, "こんにちは、世界");
        assert!(!record.body.contains('\u{FFFD}'));
    }

    #[test]
    fn test_mbox_separator_and_bom_are_skipped() {
        let raw = b"\xEF\xBB\xBFFrom alice@example.com Thu Jan  4 10:00:00 2024\nSubject: Hi\n\nbody\n";
        let record = decode_message(raw).unwrap();
        assert_eq!(record.subject, "Hi");
    }

    #[test]
    fn test_normalize_body() {
        assert_eq!(normalize_body("\r\n\r\nline1  \r\nline2\rline3\n\n"), "line1\nline2\nline3");
        assert_eq!(normalize_body("a\n\n\nb"), "a\n\n\nb");
    }
}
