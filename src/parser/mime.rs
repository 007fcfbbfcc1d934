//! MIME body extraction: a walk over the `mail-parser` part tree, transfer
//! decoding, charset conversion and HTML-to-text fallback.

use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders, PartType};
use tracing::debug;

use super::charset;
use super::transfer::TransferEncoding;

/// Maximum depth for recursive multipart parsing (to prevent stack overflow on adversarial input).
const MAX_DEPTH: usize = 10;

/// The textual flavor of a leaf part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Plain,
    Html,
}

/// A decoded textual leaf part, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPart {
    pub kind: TextKind,
    pub text: String,
}

/// Extract the best plain-text body of a raw message.
///
/// Preference order: the first inline `text/plain` part, then the first
/// inline `text/html` part converted to text. Returns `None` when the
/// message has no textual part at all.
pub fn extract_body(raw: &[u8]) -> Option<String> {
    let message = MessageParser::default().parse(raw)?;
    let mut parts = Vec::new();
    collect_text_parts(&message, 0, &mut parts);

    if let Some(plain) = parts.iter().find(|p| p.kind == TextKind::Plain) {
        return Some(plain.text.clone());
    }
    parts
        .into_iter()
        .find(|p| p.kind == TextKind::Html)
        .map(|p| html_to_text(&p.text))
}

/// Walk a parsed message depth-first and collect every inline text leaf.
pub fn collect_text_parts(message: &Message<'_>, depth: usize, out: &mut Vec<TextPart>) {
    if !message.parts.is_empty() {
        walk_part(message, 0, depth, out);
    }
}

fn walk_part(message: &Message<'_>, id: usize, depth: usize, out: &mut Vec<TextPart>) {
    if depth > MAX_DEPTH {
        debug!(depth, "MIME nesting too deep, ignoring remaining parts");
        return;
    }
    let Some(part) = message.parts.get(id) else {
        return;
    };

    match &part.body {
        PartType::Multipart(children) => {
            for &child in children {
                walk_part(message, child, depth + 1, out);
            }
        }
        PartType::Message(inner) => {
            if !is_attachment(part) {
                collect_text_parts(inner, depth + 1, out);
            }
        }
        PartType::Text(_) | PartType::Html(_) => {
            if is_attachment(part) {
                return;
            }
            match text_kind(part) {
                Some(kind) => out.push(TextPart {
                    kind,
                    text: decoded_text(message, part),
                }),
                None => debug!(
                    content_type = part.content_type().map(|ct| ct.ctype()).unwrap_or(""),
                    "Skipping non-text part"
                ),
            }
        }
        PartType::Binary(_) | PartType::InlineBinary(_) => {}
    }
}

fn is_attachment(part: &MessagePart<'_>) -> bool {
    part.content_disposition()
        .map(|cd| cd.is_attachment())
        .unwrap_or(false)
}

/// `Content-Type` defaults to `text/plain` (RFC 2045 §5.2). A multipart
/// part without a usable boundary is read as plain text too.
fn text_kind(part: &MessagePart<'_>) -> Option<TextKind> {
    let Some(ct) = part.content_type() else {
        return Some(TextKind::Plain);
    };
    let subtype = ct.subtype().unwrap_or("plain");
    match ct.ctype() {
        "text" if subtype.eq_ignore_ascii_case("html") => Some(TextKind::Html),
        "text" if subtype.eq_ignore_ascii_case("plain") => Some(TextKind::Plain),
        "multipart" => Some(TextKind::Plain),
        _ => None,
    }
}

/// Apply the transfer encoding to the part's raw bytes, then the declared
/// charset (with fallbacks).
fn decoded_text(message: &Message<'_>, part: &MessagePart<'_>) -> String {
    let declared = part.content_type().and_then(|ct| ct.attribute("charset"));
    let encoding = part
        .content_transfer_encoding()
        .map(TransferEncoding::from_header)
        .unwrap_or(TransferEncoding::Identity);

    match message.raw_message.get(part.offset_body..part.offset_end) {
        Some(raw) => charset::decode_text(declared, &encoding.decode(raw)),
        None => {
            debug!(
                offset_body = part.offset_body,
                offset_end = part.offset_end,
                "Part offsets outside the message, using parser text"
            );
            part.text_contents().unwrap_or_default().to_string()
        }
    }
}

/// Convert HTML to plain text.
///
/// - Removes `<script>`, `<style>` and `<head>` blocks
/// - Turns `<br>` and block-level tags into line breaks
/// - Strips every remaining tag
/// - Decodes named and numeric character references
/// - Collapses runs of blank lines
pub fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();
    for tag in ["script", "style", "head"] {
        text = remove_tag_block(&text, tag);
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        let after = &rest[open..];
        let Some(close) = after.find('>') else {
            // A lone '<' is text, not markup.
            result.push_str(after);
            rest = "";
            break;
        };
        if is_line_break_tag(&after[1..close]) {
            result.push('\n');
        }
        rest = &after[close + 1..];
    }
    result.push_str(rest);

    let decoded = decode_entities(&result);

    // Collapse multiple blank lines into at most one
    let mut prev_was_blank = false;
    let mut cleaned = String::with_capacity(decoded.len());
    for line in decoded.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !prev_was_blank {
                cleaned.push('\n');
                prev_was_blank = true;
            }
        } else {
            cleaned.push_str(trimmed);
            cleaned.push('\n');
            prev_was_blank = false;
        }
    }

    cleaned.trim().to_string()
}

/// `true` for tags that end a visual line (`br`, `p`, `div`, `li`, …).
fn is_line_break_tag(inner: &str) -> bool {
    let name: String = inner
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(
        name.as_str(),
        "br" | "p" | "div" | "tr" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            | "blockquote" | "pre" | "table" | "hr"
    )
}

/// Decode `&amp;`-style and `&#NNN;` / `&#xHH;` references.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity_char(&after[..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity_char(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "copy" => Some('©'),
        "yen" => Some('¥'),
        _ => None,
    }
}

/// Remove an entire tag block (e.g. `<script>…</script>`).
///
/// The tag name must match in full: `<head>` is removed, `<header>` is not.
/// An unclosed block runs to the end of the document.
fn remove_tag_block(html: &str, tag: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let close = format!("</{tag}>");
    let mut result = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(start) = find_open_tag(&lower, pos, tag) {
        result.push_str(&html[pos..start]);
        match lower[start..].find(&close) {
            Some(end) => pos = start + end + close.len(),
            None => return result,
        }
    }
    result.push_str(&html[pos..]);
    result
}

/// Offset of the next `<tag` in `lower` (from `from` on) that is followed by
/// `>`, `/` or whitespace.
fn find_open_tag(lower: &str, from: usize, tag: &str) -> Option<usize> {
    let open = format!("<{tag}");
    let mut search = from;

    while let Some(found) = lower[search..].find(&open) {
        let start = search + found;
        let after = start + open.len();
        match lower[after..].chars().next() {
            None | Some('>' | '/') => return Some(start),
            Some(c) if c.is_whitespace() => return Some(start),
            Some(_) => search = after,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(raw: &[u8]) -> Option<String> {
        extract_body(raw)
    }

    #[test]
    fn test_single_part_default_is_text_plain() {
        let raw = b"Subject: Hi\n\nHello there\n";
        assert_eq!(body_of(raw).as_deref(), Some("Hello there\n"));
    }

    #[test]
    fn test_prefers_plain_over_html() {
        let raw = b"Content-Type: multipart/alternative; boundary=XX\n\n\
--XX\nContent-Type: text/html\n\n<p>rich</p>\n\
--XX\nContent-Type: text/plain\n\nplain\n\
--XX--\n";
        assert_eq!(body_of(raw).as_deref(), Some("plain"));
    }

    #[test]
    fn test_html_only_falls_back_to_text() {
        let raw = b"Content-Type: multipart/alternative; boundary=XX\n\n\
--XX\nContent-Type: text/html; charset=utf-8\n\n<p>Tom &amp; Jerry</p><p>line2</p>\n\
--XX--\n";
        assert_eq!(body_of(raw).as_deref(), Some("Tom & Jerry\n\nline2"));
    }

    #[test]
    fn test_nested_multipart_and_attachment_skipped() {
        let raw = b"Content-Type: multipart/mixed; boundary=\"outer\"\n\n\
preamble\n\
--outer\nContent-Type: text/plain\nContent-Disposition: attachment; filename=a.txt\n\nnot me\n\
--outer\nContent-Type: multipart/alternative; boundary=inner\n\n\
--inner\nContent-Type: text/plain; charset=us-ascii\n\ninner text\n\
--inner--\n\
--outer--\nepilogue\n";
        assert_eq!(body_of(raw).as_deref(), Some("inner text"));
    }

    #[test]
    fn test_base64_iso_2022_jp_part() {
        let (encoded, _, _) = encoding_rs::ISO_2022_JP.encode("本文です");
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(&encoded);
        let raw = format!(
            "Content-Type: text/plain; charset=\"ISO-2022-JP\"\n\
Content-Transfer-Encoding: base64\n\n{b64}\n"
        );
        assert_eq!(body_of(raw.as_bytes()).as_deref(), Some("本文です"));
    }

    #[test]
    fn test_quoted_printable_shift_jis_part_in_multipart() {
        let raw = b"Content-Type: multipart/mixed; boundary=q\r\n\r\n\
--q\r\nContent-Type: text/plain; charset=Shift_JIS\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\r\n\
=93=FA=96=7B\r\n\
--q--\r\n";
        assert_eq!(body_of(raw).as_deref(), Some("日本"));
    }

    #[test]
    fn test_us_ascii_label_on_utf8_body() {
        let raw = "Content-Type: text/plain; charset=us-ascii\n\
Content-Transfer-Encoding: 8bit\n\nこんにちは\n";
        assert_eq!(body_of(raw.as_bytes()).as_deref(), Some("こんにちは\n"));
    }

    #[test]
    fn test_forwarded_message_is_descended() {
        let raw = b"Content-Type: multipart/mixed; boundary=b\n\n\
--b\nContent-Type: message/rfc822\n\nSubject: inner\n\ninside\n\
--b--\n";
        assert_eq!(body_of(raw).as_deref(), Some("inside"));
    }

    #[test]
    fn test_attached_message_is_skipped() {
        let raw = b"Content-Type: multipart/mixed; boundary=b\n\n\
--b\nContent-Type: text/html\n\n<b>outer</b>\n\
--b\nContent-Type: message/rfc822\nContent-Disposition: attachment\n\n\
Subject: inner\n\ninside\n\
--b--\n";
        assert_eq!(body_of(raw).as_deref(), Some("outer"));
    }

    #[test]
    fn test_no_text_part() {
        let raw = b"Content-Type: multipart/mixed; boundary=b\n\n\
--b\nContent-Type: image/png\nContent-Transfer-Encoding: base64\n\niVBORw0KGgo=\n\
--b--\n";
        assert_eq!(body_of(raw), None);
    }

    #[test]
    fn test_other_text_subtypes_are_skipped() {
        let raw = b"Content-Type: multipart/mixed; boundary=b\n\n\
--b\nContent-Type: text/calendar\n\nBEGIN:VCALENDAR\n\
--b\nContent-Type: text/plain\n\nagenda\n\
--b--\n";
        assert_eq!(body_of(raw).as_deref(), Some("agenda"));
    }

    #[test]
    fn test_html_to_text_removes_scripts() {
        let html = "Before<script>alert('xss')</script>After";
        assert_eq!(html_to_text(html), "BeforeAfter");
    }

    #[test]
    fn test_html_header_element_is_kept() {
        let html = "<header>Newsletter</header><p>Important content</p>";
        assert_eq!(html_to_text(html), "Newsletter\nImportant content");
    }

    #[test]
    fn test_html_head_block_is_removed() {
        let html = "<HTML><Head lang=en><title>t</title></head><body>Hi</body></html>";
        assert_eq!(html_to_text(html), "Hi");
        assert_eq!(html_to_text("<styles>y</styles>"), "y");
    }

    #[test]
    fn test_html_numeric_entities() {
        assert_eq!(html_to_text("&#26085;&#x672C; &lt;ok&gt;"), "日本 <ok>");
        assert_eq!(html_to_text("AT&T & co"), "AT&T & co");
    }
}
