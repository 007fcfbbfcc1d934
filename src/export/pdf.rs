//! PDF 1.4 writer built on `lopdf`.
//!
//! Fonts are referenced, not embedded: each role gets a Type0 font over a
//! CIDFontType0 descendant from the Adobe-Japan1 collection, which every
//! mainstream reader substitutes with a local Japanese face.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::config::{Config, FontConfig};
use crate::error::RenderError;
use crate::export::font;
use crate::export::layout::{self, Color, FontRole, Item, Page};
use crate::i18n::{Lang, PdfLabels};
use crate::model::geometry::PageGeometry;
use crate::model::message::MessageRecord;

const PRODUCER: &str = concat!("eml2pdf ", env!("CARGO_PKG_VERSION"));

/// Everything the renderer needs besides the message itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub geometry: PageGeometry,
    pub fonts: FontConfig,
    pub labels: PdfLabels,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            fonts: FontConfig::default(),
            labels: PdfLabels::for_lang(Lang::En),
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &Config, lang: Lang) -> Self {
        Self {
            geometry: config.page.clone(),
            fonts: config.fonts.clone(),
            labels: PdfLabels::for_lang(lang),
        }
    }
}

/// Render a message to the bytes of a complete PDF file.
pub fn render_pdf(record: &MessageRecord, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    let pages = layout::layout_message(record, &options.geometry, &options.labels);
    let mut doc = build_document(record, &pages, options)?;

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    debug!(pages = pages.len(), bytes = out.len(), "Rendered PDF");
    Ok(out)
}

fn build_document(
    record: &MessageRecord,
    pages: &[Page],
    options: &RenderOptions,
) -> Result<Document, RenderError> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let heading_id = add_font(&mut doc, &options.fonts.heading);
    let body_id = add_font(&mut doc, &options.fonts.body);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => heading_id,
            "F2" => body_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = page_content(page);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let geometry = &options.geometry;
    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(geometry.width),
                Object::Real(geometry.height),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(info_dictionary(record, &options.labels));
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    Ok(doc)
}

/// Drawing operators for one page.
fn page_content(page: &Page) -> Content {
    let mut ops = Vec::new();
    for item in &page.items {
        match item {
            Item::Text(run) => {
                let font_name = match run.font {
                    FontRole::Heading => "F1",
                    FontRole::Body => "F2",
                };
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![font_name.into(), Object::Real(run.size)],
                ));
                ops.push(Operation::new("rg", rgb(run.color)));
                ops.push(Operation::new(
                    "Td",
                    vec![Object::Real(run.x), Object::Real(run.baseline)],
                ));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(
                        font::encode_ucs2(&run.text),
                        StringFormat::Hexadecimal,
                    )],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            Item::Rule(rule) => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("RG", rgb(rule.color)));
                ops.push(Operation::new("w", vec![Object::Real(rule.thickness)]));
                ops.push(Operation::new(
                    "m",
                    vec![Object::Real(rule.x1), Object::Real(rule.y)],
                ));
                ops.push(Operation::new(
                    "l",
                    vec![Object::Real(rule.x2), Object::Real(rule.y)],
                ));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    Content { operations: ops }
}

fn rgb(color: Color) -> Vec<Object> {
    color.components().into_iter().map(Object::Real).collect()
}

/// Descriptor metrics of the standard Japanese CID fonts.
struct DescriptorMetrics {
    flags: i64,
    bbox: [i64; 4],
    ascent: i64,
    descent: i64,
    cap_height: i64,
    stem_v: i64,
}

impl DescriptorMetrics {
    fn for_font(base_font: &str) -> Self {
        if base_font.contains("Min") {
            // Serif (Mincho) faces
            Self {
                flags: 6,
                bbox: [-123, -257, 1001, 910],
                ascent: 723,
                descent: -241,
                cap_height: 709,
                stem_v: 69,
            }
        } else {
            Self {
                flags: 4,
                bbox: [-92, -250, 1010, 922],
                ascent: 752,
                descent: -221,
                cap_height: 737,
                stem_v: 114,
            }
        }
    }
}

/// Add a Type0 font over a non-embedded Adobe-Japan1 CID font.
fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    let metrics = DescriptorMetrics::for_font(base_font);
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font,
        "Flags" => metrics.flags,
        "FontBBox" => metrics.bbox.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
        "ItalicAngle" => Object::Integer(0),
        "Ascent" => metrics.ascent,
        "Descent" => metrics.descent,
        "CapHeight" => metrics.cap_height,
        "StemV" => metrics.stem_v,
    });

    let (first, last, half) = font::HALF_WIDTH_CIDS;
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => base_font,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal(font::REGISTRY),
            "Ordering" => Object::string_literal(font::ORDERING),
            "Supplement" => font::SUPPLEMENT,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => font::DEFAULT_WIDTH,
        "W" => vec![
            Object::Integer(first),
            Object::Integer(last),
            Object::Integer(half),
        ],
    });

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => format!("{base_font}-{}", font::CMAP).as_str(),
        "Encoding" => font::CMAP,
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
    })
}

fn info_dictionary(record: &MessageRecord, labels: &PdfLabels) -> Dictionary {
    let title = if record.subject.trim().is_empty() {
        labels.no_subject
    } else {
        record.subject.as_str()
    };
    let text = |s: &str| Object::String(font::encode_text_string(s), StringFormat::Hexadecimal);

    let mut info = dictionary! {
        "Title" => text(title),
        "Producer" => text(PRODUCER),
        "CreationDate" => Object::string_literal(
            Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
        ),
    };
    if !record.from.is_empty() {
        info.set("Author", text(&record.from));
    }
    info
}
