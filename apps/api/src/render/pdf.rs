//! Serializes laid-out pages into a PDF byte buffer with `lopdf`.
//!
//! Text uses the unembedded standard Type1 faces with `WinAnsiEncoding`, so every
//! string is transcoded to single-byte WinAnsi before it is written.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::render::font_metrics::FontFace;
use crate::render::layout::{PageGeometry, PageLayout, PlacedRun};
use crate::render::RenderError;

/// Metadata written to the document's `/Info` dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
}

/// Maps a string to WinAnsi (CP1252) bytes. Unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            '\t' => b' ',
            c if (c as u32) >= 0x20 && (c as u32) < 0x7F => c as u8,
            c if (c as u32) >= 0xA0 && (c as u32) <= 0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

fn run_operations(run: &PlacedRun, ops: &mut Vec<Operation>) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![run.face.resource_name().into(), run.size.into()],
    ));
    ops.push(Operation::new(
        "rg",
        vec![run.color.r.into(), run.color.g.into(), run.color.b.into()],
    ));
    ops.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(&run.text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Writes `pages` as a complete PDF document and returns its bytes.
pub fn write_pdf(
    pages: &[PageLayout],
    geometry: &PageGeometry,
    info: &DocumentInfo,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let media_box: Vec<Object> = vec![0.into(), 0.into(), geometry.width.into(), geometry.height.into()];

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let mut operations = Vec::with_capacity(page.runs.len() * 6);
        for run in &page.runs {
            run_operations(run, &mut operations);
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(&info.title), StringFormat::Literal),
        "Author" => Object::String(encode_win_ansi(&info.author), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("resume-api ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
