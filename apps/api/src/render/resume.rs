//! Resume → PDF: builds the fixed section sequence and hands it to the layout engine.

use crate::models::resume::{PersonalInfo, ResumeDocument};
use crate::render::font_metrics::{get_metrics, FontFace};
use crate::render::layout::{
    layout_blocks, Block, PageGeometry, PageLayout, ParagraphStyle, PlacedRun, Span,
    POINTS_PER_INCH,
};
use crate::render::pdf::{write_pdf, DocumentInfo};
use crate::render::RenderError;

pub const MAX_SKILLS: usize = 10;
pub const MAX_EXPERIENCE: usize = 3;
pub const MAX_EDUCATION: usize = 2;
pub const MAX_PROJECTS: usize = 3;

pub const SKILL_SEPARATOR: &str = " \u{2022} ";

const HEADER_GAP: f32 = 0.2 * POINTS_PER_INCH;
/// After the summary and skills paragraphs.
const SECTION_GAP: f32 = 0.15 * POINTS_PER_INCH;
/// After each experience, education and project entry.
const ENTRY_GAP: f32 = 0.1 * POINTS_PER_INCH;

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Printed centered at the bottom of every page.
    pub footer: Option<String>,
}

fn heading(title: &str) -> Block {
    Block::paragraph(vec![Span::bold(title)], ParagraphStyle::heading())
}

fn body(spans: Vec<Span>) -> Block {
    Block::paragraph(spans, ParagraphStyle::body())
}

/// Builds the resume's blocks in print order. List sections are truncated and
/// omitted entirely when empty.
pub fn resume_blocks(doc: &ResumeDocument, info: &PersonalInfo) -> Vec<Block> {
    let mut blocks = Vec::new();

    let name = if info.name.trim().is_empty() { "N/A" } else { info.name.as_str() };
    blocks.push(Block::paragraph(vec![Span::bold(name)], ParagraphStyle::title()));
    blocks.push(body(vec![Span::regular(format!("{} | {}", info.email, info.phone))]));
    blocks.push(Block::Spacer(HEADER_GAP));

    if !doc.summary.trim().is_empty() {
        blocks.push(heading("PROFESSIONAL SUMMARY"));
        blocks.push(body(vec![Span::regular(doc.summary.as_str())]));
        blocks.push(Block::Spacer(SECTION_GAP));
    }

    if !doc.skills.is_empty() {
        let shown: Vec<&str> = doc.skills.iter().take(MAX_SKILLS).map(String::as_str).collect();
        blocks.push(heading("SKILLS"));
        blocks.push(body(vec![Span::regular(shown.join(SKILL_SEPARATOR))]));
        blocks.push(Block::Spacer(SECTION_GAP));
    }

    if !doc.experience.is_empty() {
        blocks.push(heading("EXPERIENCE"));
        for item in doc.experience.iter().take(MAX_EXPERIENCE) {
            blocks.push(body(vec![
                Span::bold(item.title.as_str()),
                Span::regular(format!(" - {}", item.company)),
            ]));
            blocks.push(body(vec![Span::regular(item.duration.as_str())]));
            blocks.push(body(vec![Span::regular(item.description.as_str())]));
            blocks.push(Block::Spacer(ENTRY_GAP));
        }
    }

    if !doc.education.is_empty() {
        blocks.push(heading("EDUCATION"));
        for item in doc.education.iter().take(MAX_EDUCATION) {
            blocks.push(body(vec![
                Span::bold(item.degree.as_str()),
                Span::regular(format!(" - {} ({})", item.institution, item.year)),
            ]));
            if !item.details.trim().is_empty() {
                blocks.push(body(vec![Span::regular(item.details.as_str())]));
            }
            blocks.push(Block::Spacer(ENTRY_GAP));
        }
    }

    if !doc.projects.is_empty() {
        blocks.push(heading("PROJECTS"));
        for item in doc.projects.iter().take(MAX_PROJECTS) {
            blocks.push(body(vec![Span::bold(item.name.as_str())]));
            blocks.push(body(vec![Span::regular(item.description.as_str())]));
            blocks.push(body(vec![Span::italic(format!(
                "Technologies: {}",
                item.technologies
            ))]));
            blocks.push(Block::Spacer(ENTRY_GAP));
        }
    }

    blocks
}

/// Adds the footer line to every page, centered inside the bottom margin.
fn stamp_footer(pages: &mut [PageLayout], text: &str, geometry: &PageGeometry) {
    let style = ParagraphStyle::footer();
    let width = get_metrics(FontFace::Regular).measure_str(text, style.font_size);
    let x = geometry.margin_left + (geometry.text_width() - width).max(0.0) / 2.0;
    for page in pages {
        page.runs.push(PlacedRun {
            x,
            y: 18.0,
            face: FontFace::Regular,
            size: style.font_size,
            color: style.color,
            text: text.to_string(),
        });
    }
}

/// Lays out and serializes the resume. CPU-bound; call from a blocking task.
pub fn render_resume_pdf(
    doc: &ResumeDocument,
    info: &PersonalInfo,
    options: &RenderOptions,
) -> Result<Vec<u8>, RenderError> {
    let footer = options.footer.as_deref().filter(|f| !f.trim().is_empty());
    let geometry = match footer {
        Some(_) => PageGeometry::letter().with_footer_room(),
        None => PageGeometry::letter(),
    };

    let mut pages = layout_blocks(&resume_blocks(doc, info), &geometry);
    if let Some(text) = footer {
        stamp_footer(&mut pages, text, &geometry);
    }

    let title = if info.name.trim().is_empty() {
        "Resume".to_string()
    } else {
        format!("Resume - {}", info.name)
    };
    write_pdf(
        &pages,
        &geometry,
        &DocumentInfo {
            title,
            author: info.name.clone(),
        },
    )
}
