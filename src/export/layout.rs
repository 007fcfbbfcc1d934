//! Line breaking and pagination.
//!
//! Turns a [`MessageRecord`] into a list of positioned text runs and rules,
//! page by page. Nothing here knows about PDF objects; [`super::pdf`] only
//! has to draw what this module placed.

use crate::export::font::{self, advance};
use crate::i18n::PdfLabels;
use crate::model::geometry::{PageGeometry, TextStyle};
use crate::model::message::MessageRecord;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const fn hex(rgb: u32) -> Self {
        Self((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Components in the 0.0–1.0 range used by PDF color operators.
    pub fn components(self) -> [f32; 3] {
        [self.0, self.1, self.2].map(|c| f32::from(c) / 255.0)
    }
}

pub const SUBJECT_COLOR: Color = Color::hex(0x111111);
pub const LABEL_COLOR: Color = Color::hex(0x888888);
pub const HEADER_COLOR: Color = Color::hex(0x333333);
pub const BODY_COLOR: Color = Color::hex(0x1a1a1a);
pub const RULE_COLOR: Color = Color::hex(0xcccccc);

/// Thickness of the rule under the header block, in points.
pub const RULE_THICKNESS: f32 = 0.5;

/// Which of the two document fonts a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Heading,
    Body,
}

/// A run of text drawn at a fixed baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub baseline: f32,
    pub size: f32,
    pub font: FontRole,
    pub color: Color,
    pub text: String,
}

/// A horizontal line.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub thickness: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text(TextRun),
    Rule(Rule),
}

/// Everything drawn on one page, in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Text of every run on the page, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            Item::Text(run) => Some(run.text.as_str()),
            Item::Rule(_) => None,
        })
    }
}

/// One piece of a styled line: horizontal offset from the left margin,
/// text, font and color.
struct Span<'t> {
    offset: f32,
    text: &'t str,
    font: FontRole,
    color: Color,
}

/// Top-to-bottom cursor over a growing list of pages.
struct Cursor<'g> {
    geometry: &'g PageGeometry,
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl<'g> Cursor<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Page::default(),
            y: geometry.top(),
        }
    }

    fn flush(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.geometry.top();
    }

    /// Start a new page unless `height` still fits above the bottom margin.
    /// An empty page always accepts the item, so oversized items cannot loop.
    fn reserve(&mut self, height: f32) {
        if self.y - height < self.geometry.bottom() && !self.current.is_empty() {
            self.flush();
        }
    }

    /// Vertical gap. Dropped at the top of a page.
    fn space(&mut self, height: f32) {
        if self.current.is_empty() {
            return;
        }
        if self.y - height < self.geometry.bottom() {
            self.flush();
        } else {
            self.y -= height;
        }
    }

    fn line(&mut self, style: TextStyle, spans: &[Span<'_>]) {
        self.reserve(style.leading);
        let baseline = self.y - style.size;
        for span in spans.iter().filter(|s| !s.text.is_empty()) {
            self.current.items.push(Item::Text(TextRun {
                x: self.geometry.margin_left + span.offset,
                baseline,
                size: style.size,
                font: span.font,
                color: span.color,
                text: span.text.to_string(),
            }));
        }
        self.y -= style.leading;
    }

    fn rule(&mut self, thickness: f32, color: Color) {
        self.reserve(thickness);
        let y = self.y - thickness / 2.0;
        self.current.items.push(Item::Rule(Rule {
            x1: self.geometry.margin_left,
            x2: self.geometry.width - self.geometry.margin_right,
            y,
            thickness,
            color,
        }));
        self.y -= thickness;
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Lay out a message: subject, labeled header lines, a rule, then the body.
///
/// Always returns at least one page.
pub fn layout_message(
    record: &MessageRecord,
    geometry: &PageGeometry,
    labels: &PdfLabels,
) -> Vec<Page> {
    let mut cursor = Cursor::new(geometry);
    let width = geometry.text_width();

    // Subject
    let subject = if record.subject.trim().is_empty() {
        labels.no_subject
    } else {
        record.subject.as_str()
    };
    let subject = font::sanitize(subject);
    for line in wrap(&subject, geometry.subject.size, width) {
        cursor.line(
            geometry.subject,
            &[Span {
                offset: 0.0,
                text: &line,
                font: FontRole::Heading,
                color: SUBJECT_COLOR,
            }],
        );
    }
    cursor.space(geometry.subject_gap);

    // Header lines
    let mut fields = vec![(labels.from, &record.from), (labels.to, &record.to)];
    if !record.cc.trim().is_empty() {
        fields.push((labels.cc, &record.cc));
    }
    fields.push((labels.date, &record.date));

    let size = geometry.header.size;
    for (label, value) in fields {
        let label = format!("{label}:");
        let indent = font::text_width(&label, size) + font::text_width("  ", size);
        let value = font::sanitize(value);
        let lines = wrap(&value, size, (width - indent).max(size));
        for (i, line) in lines.iter().enumerate() {
            let mut spans = Vec::with_capacity(2);
            if i == 0 {
                spans.push(Span {
                    offset: 0.0,
                    text: &label,
                    font: FontRole::Heading,
                    color: LABEL_COLOR,
                });
            }
            spans.push(Span {
                offset: indent,
                text: line,
                font: FontRole::Heading,
                color: HEADER_COLOR,
            });
            cursor.line(geometry.header, &spans);
        }
    }

    // Separator
    cursor.space(geometry.rule_gap);
    cursor.rule(RULE_THICKNESS, RULE_COLOR);
    cursor.space(geometry.rule_gap);

    // Body
    if record.has_body() {
        for source_line in record.body.split('\n') {
            if source_line.trim().is_empty() {
                cursor.space(geometry.blank_line);
                continue;
            }
            let text = font::sanitize(source_line);
            for line in wrap(&text, geometry.body.size, width) {
                cursor.line(
                    geometry.body,
                    &[Span {
                        offset: 0.0,
                        text: &line,
                        font: FontRole::Body,
                        color: BODY_COLOR,
                    }],
                );
            }
            cursor.space(geometry.paragraph_gap);
        }
    }

    cursor.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Space,
    Wide,
}

/// Split text into runs of spaces, runs of narrow non-space characters, and
/// single wide characters.
fn tokenize(text: &str) -> Vec<(TokenKind, &str)> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut kind: Option<TokenKind> = None;

    for (i, c) in text.char_indices() {
        let k = if c == ' ' || c == '\u{3000}' {
            TokenKind::Space
        } else if font::is_wide(c) {
            TokenKind::Wide
        } else {
            TokenKind::Word
        };
        if let Some(prev) = kind {
            if prev != k || k == TokenKind::Wide {
                tokens.push((prev, &text[start..i]));
                start = i;
            }
        }
        kind = Some(k);
    }
    if let Some(k) = kind {
        tokens.push((k, &text[start..]));
    }
    tokens
}

/// Greedy line breaking at `max_width` points.
///
/// Breaks at spaces when possible and before or after any wide character;
/// narrow words longer than a line are split by character. Spaces at the
/// start of a continuation line are dropped. Always returns at least one
/// (possibly empty) line.
pub fn wrap(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0.0f32;

    let break_line = |lines: &mut Vec<String>, line: &mut String, width: &mut f32| {
        lines.push(line.trim_end().to_string());
        line.clear();
        *width = 0.0;
    };

    for (kind, token) in tokenize(text) {
        let token_width = font::text_width(token, size);
        match kind {
            TokenKind::Space => {
                if line.is_empty() && !lines.is_empty() {
                    continue;
                }
                if width + token_width > max_width {
                    break_line(&mut lines, &mut line, &mut width);
                    continue;
                }
                line.push_str(token);
                width += token_width;
            }
            TokenKind::Word | TokenKind::Wide => {
                if width + token_width > max_width && !line.trim().is_empty() {
                    break_line(&mut lines, &mut line, &mut width);
                }
                if token_width <= max_width - width {
                    line.push_str(token);
                    width += token_width;
                    continue;
                }
                for c in token.chars() {
                    let w = f32::from(advance(c)) * size / 1000.0;
                    if width + w > max_width && !line.trim().is_empty() {
                        break_line(&mut lines, &mut line, &mut width);
                    }
                    line.push(c);
                    width += w;
                }
            }
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line.trim_end().to_string());
    }
    lines
}
