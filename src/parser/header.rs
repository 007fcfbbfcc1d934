//! RFC 5322 header parsing: framing, folding and RFC 2047 encoded-words.

use tracing::debug;

use super::charset;
use super::transfer;

/// Strip a UTF-8 BOM and a leading mbox `From ` separator line.
pub fn strip_envelope(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Split a message (or MIME part) into its header block and body.
///
/// The blank line separating them belongs to neither half. Input without
/// a blank line is all headers.
pub fn split_header_body(data: &[u8]) -> (&[u8], &[u8]) {
    // A part that starts with a blank line has no headers at all.
    if let Some(rest) = data.strip_prefix(b"\r\n") {
        return (&[], rest);
    }
    if let Some(rest) = data.strip_prefix(b"\n") {
        return (&[], rest);
    }

    match find_header_end(data) {
        Some((header_len, body_start)) => (&data[..header_len], &data[body_start..]),
        None => (data, &[]),
    }
}

/// Find where headers end: the length of the header block (including its
/// last line break) and the offset where the body starts.
fn find_header_end(data: &[u8]) -> Option<(usize, usize)> {
    for i in 0..data.len().saturating_sub(1) {
        if data[i] != b'\n' {
            continue;
        }
        if data[i + 1] == b'\n' {
            return Some((i + 1, i + 2));
        }
        if data[i + 1] == b'\r' && data.get(i + 2) == Some(&b'\n') {
            return Some((i + 1, i + 3));
        }
    }
    None
}

/// Decode raw header bytes to text.
///
/// Headers should be ASCII, but raw 8-bit UTF-8 or Japanese legacy
/// charsets appear in the wild, so the undeclared fallback chain applies.
pub fn decode_header_bytes(bytes: &[u8]) -> String {
    charset::decode_text(None, bytes)
}

/// Unfold headers: join continuation lines (starting with space or tab) with the previous header.
///
/// Returns a list of `(lowercase_name, raw_value)` pairs.
pub fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim();
            if !is_field_name(name) {
                continue;
            }
            let value = line[colon_pos + 1..].trim().to_string();
            result.push((name.to_ascii_lowercase(), value));
        }
        // Lines without a colon and not a continuation are silently skipped
    }

    result
}

/// RFC 5322 field names are printable ASCII without spaces or colons.
fn is_field_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| (33..=126).contains(&b) && b != b':')
}

/// Get the first value for a header name (case-insensitive).
pub fn get_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `"Hola mundo"`
///
/// Literal text between words is kept as is; whitespace that only
/// separates two encoded words is dropped (RFC 2047 §6.2). Adjacent words
/// in the same charset are joined at the byte level before conversion, so
/// a multi-byte character split across two words still decodes. A
/// malformed word is kept verbatim.
pub fn decode_encoded_words(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut pending: Option<PendingRun> = None;
    let mut remaining = input;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];
        let after_start = &remaining[start + 2..];

        let Some(word) = parse_encoded_word(after_start) else {
            flush(&mut pending, &mut result);
            result.push_str(before);
            result.push_str("=?");
            remaining = after_start;
            continue;
        };

        let adjacent = pending.is_some() && before.trim().is_empty();
        match pending.as_mut() {
            Some(run) if adjacent && run.charset.eq_ignore_ascii_case(word.charset) => {
                run.bytes.extend_from_slice(&word.bytes);
            }
            _ => {
                flush(&mut pending, &mut result);
                if !adjacent {
                    result.push_str(before);
                }
                pending = Some(PendingRun {
                    charset: word.charset.to_string(),
                    bytes: word.bytes,
                });
            }
        }

        remaining = &after_start[word.consumed..];
    }

    flush(&mut pending, &mut result);
    result.push_str(remaining);
    result
}

/// Decoded bytes of consecutive encoded-words sharing a charset.
struct PendingRun {
    charset: String,
    bytes: Vec<u8>,
}

fn flush(pending: &mut Option<PendingRun>, out: &mut String) {
    if let Some(run) = pending.take() {
        out.push_str(&charset::decode_text(Some(&run.charset), &run.bytes));
    }
}

struct EncodedWord<'a> {
    charset: &'a str,
    bytes: Vec<u8>,
    consumed: usize, // bytes consumed from the string *after* the initial "=?"
}

fn parse_encoded_word(s: &str) -> Option<EncodedWord<'_>> {
    // Format: charset?encoding?encoded_text?=
    let first_q = s.find('?')?;
    let charset = &s[..first_q];
    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return None;
    }

    let rest = &s[first_q + 1..];
    let second_q = rest.find('?')?;
    let encoding = &rest[..second_q];

    let rest2 = &rest[second_q + 1..];
    let end = rest2.find("?=")?;
    let encoded_text = &rest2[..end];
    if encoded_text.contains(char::is_whitespace) {
        return None;
    }

    let bytes = match encoding {
        "B" | "b" => transfer::decode_base64(encoded_text.as_bytes())?,
        "Q" | "q" => decode_q_encoding(encoded_text),
        _ => {
            debug!(encoding, "Unknown encoded-word encoding, keeping literal");
            return None;
        }
    };

    Some(EncodedWord {
        charset,
        bytes,
        consumed: first_q + 1 + second_q + 1 + end + 2,
    })
}

/// Decode Q-encoding (RFC 2047): underscores → spaces, `=XX` → byte.
fn decode_q_encoding(input: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                result.push(b' ');
                i += 1;
            }
            b'=' if i + 2 < bytes.len() => {
                match hex_byte(bytes[i + 1], bytes[i + 2]) {
                    Some(byte) => {
                        result.push(byte);
                        i += 3;
                    }
                    None => {
                        result.push(b'=');
                        i += 1;
                    }
                }
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }
    result
}

fn hex_byte(hi: u8, lo: u8) -> Option<u8> {
    let digit = |c: u8| (c as char).to_digit(16);
    Some((digit(hi)? * 16 + digit(lo)?) as u8)
}
