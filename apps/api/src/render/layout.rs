//! Flow layout. Turns styled paragraphs into positioned text runs on fixed-size pages.
//!
//! # Model
//! - A document is a list of [`Block`]s: paragraphs made of styled [`Span`]s, and spacers.
//! - Paragraphs are word-wrapped greedily against the text column using the static
//!   glyph tables in `font_metrics`. A word wider than the column gets a line to itself.
//! - A line that would cross the bottom margin starts a new page. That is the only
//!   pagination rule; there is no widow/orphan control and no keep-together.

use crate::render::font_metrics::{get_metrics, FontFace};

// ────────────────────────────────────────────────────────────────────────────
// Geometry and styles
// ────────────────────────────────────────────────────────────────────────────

pub const POINTS_PER_INCH: f32 = 72.0;

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageGeometry {
    /// US Letter with 1" side and top margins and a 0.25" bottom margin.
    pub fn letter() -> Self {
        PageGeometry {
            width: 612.0,
            height: 792.0,
            margin_left: 72.0,
            margin_right: 72.0,
            margin_top: 72.0,
            margin_bottom: 18.0,
        }
    }

    /// Raises the bottom margin so body text clears a footer line.
    pub fn with_footer_room(mut self) -> Self {
        self.margin_bottom = self.margin_bottom.max(36.0);
        self
    }

    pub fn text_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    fn top(&self) -> f32 {
        self.height - self.margin_top
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    /// `0x2c3e50` → normalized components.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Rgb {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphStyle {
    pub font_size: f32,
    /// Baseline-to-baseline distance.
    pub leading: f32,
    pub color: Rgb,
    pub align: Align,
    pub space_before: f32,
    pub space_after: f32,
}

impl ParagraphStyle {
    /// Large centered name line.
    pub fn title() -> Self {
        ParagraphStyle {
            font_size: 24.0,
            leading: 28.8,
            color: Rgb::from_hex(0x2c3e50),
            align: Align::Center,
            space_before: 0.0,
            space_after: 6.0,
        }
    }

    /// Section headings ("EXPERIENCE", ...).
    pub fn heading() -> Self {
        ParagraphStyle {
            font_size: 14.0,
            leading: 16.8,
            color: Rgb::from_hex(0x3498db),
            align: Align::Left,
            space_before: 12.0,
            space_after: 12.0,
        }
    }

    pub fn body() -> Self {
        ParagraphStyle {
            font_size: 10.0,
            leading: 12.0,
            color: Rgb::BLACK,
            align: Align::Left,
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    /// Small centered footer text.
    pub fn footer() -> Self {
        ParagraphStyle {
            font_size: 8.0,
            leading: 9.6,
            color: Rgb::from_hex(0x7f8c8d),
            align: Align::Center,
            space_before: 0.0,
            space_after: 0.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document blocks
// ────────────────────────────────────────────────────────────────────────────

/// A run of text in one face. Whitespace at span edges is significant: it decides
/// whether the first word of the next span is separated by a space.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub face: FontFace,
}

impl Span {
    pub fn regular(text: impl Into<String>) -> Self {
        Span { text: text.into(), face: FontFace::Regular }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Span { text: text.into(), face: FontFace::Bold }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Span { text: text.into(), face: FontFace::Italic }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph { spans: Vec<Span>, style: ParagraphStyle },
    /// Vertical gap in points.
    Spacer(f32),
}

impl Block {
    pub fn paragraph(spans: Vec<Span>, style: ParagraphStyle) -> Self {
        Block::Paragraph { spans, style }
    }

    /// Concatenated text of a paragraph; empty for spacers.
    #[cfg(test)]
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph { spans, .. } => spans.iter().map(|s| s.text.as_str()).collect(),
            Block::Spacer(_) => String::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout output
// ────────────────────────────────────────────────────────────────────────────

/// One `Tj`-able piece of text at an absolute baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRun {
    pub x: f32,
    pub y: f32,
    pub face: FontFace,
    pub size: f32,
    pub color: Rgb,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub runs: Vec<PlacedRun>,
}

/// A word and whether whitespace preceded it in the source text.
#[derive(Debug, Clone, PartialEq)]
struct Word {
    text: String,
    face: FontFace,
    space_before: bool,
}

/// Splits spans into words, remembering span faces and inter-span spacing.
fn tokenize(spans: &[Span]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pending_space = false;

    for span in spans {
        let mut chars_seen = false;
        for (i, piece) in span.text.split_whitespace().enumerate() {
            let leading_ws = i > 0 || span.text.starts_with(char::is_whitespace);
            words.push(Word {
                text: piece.to_string(),
                face: span.face,
                space_before: !words.is_empty() && (leading_ws || pending_space),
            });
            chars_seen = true;
        }
        if chars_seen {
            pending_space = span.text.ends_with(char::is_whitespace);
        } else if !span.text.is_empty() {
            pending_space = true;
        }
    }
    words
}

/// A laid-out line: (face, text) runs and the total width in points.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub runs: Vec<(FontFace, String)>,
    pub width: f32,
}

/// Greedy word wrap of `spans` at `size` points into lines no wider than `max_width`.
pub fn wrap_spans(spans: &[Span], size: f32, max_width: f32) -> Vec<Line> {
    let words = tokenize(spans);
    let mut lines: Vec<Line> = Vec::new();
    let mut current = Line { runs: Vec::new(), width: 0.0 };

    for word in words {
        let metrics = get_metrics(word.face);
        let word_w = metrics.measure_str(&word.text, size);
        let starts_line = current.runs.is_empty();
        let space_w = if !starts_line && word.space_before {
            metrics.space_width(size)
        } else {
            0.0
        };

        if !starts_line && current.width + space_w + word_w > max_width {
            lines.push(std::mem::replace(
                &mut current,
                Line { runs: Vec::new(), width: 0.0 },
            ));
            push_word(&mut current, word.face, &word.text, false);
            current.width = word_w;
        } else {
            push_word(&mut current, word.face, &word.text, space_w > 0.0);
            current.width += space_w + word_w;
        }
    }

    if !current.runs.is_empty() {
        lines.push(current);
    }
    lines
}

/// Appends a word, merging into the last run when the face matches.
fn push_word(line: &mut Line, face: FontFace, text: &str, with_space: bool) {
    match line.runs.last_mut() {
        Some((last_face, last_text)) if *last_face == face => {
            if with_space {
                last_text.push(' ');
            }
            last_text.push_str(text);
        }
        _ => {
            let mut run = String::with_capacity(text.len() + 1);
            if with_space {
                run.push(' ');
            }
            run.push_str(text);
            line.runs.push((face, run));
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page flow
// ────────────────────────────────────────────────────────────────────────────

struct Flow<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<PageLayout>,
    cursor: f32,
}

impl<'a> Flow<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Flow {
            geometry,
            pages: vec![PageLayout::default()],
            cursor: geometry.top(),
        }
    }

    fn at_page_top(&self) -> bool {
        (self.cursor - self.geometry.top()).abs() < f32::EPSILON
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.cursor = self.geometry.top();
    }

    /// Moves the cursor down; gaps never carry over to a fresh page.
    fn skip(&mut self, gap: f32) {
        if self.at_page_top() {
            return;
        }
        if self.cursor - gap < self.geometry.margin_bottom {
            self.new_page();
        } else {
            self.cursor -= gap;
        }
    }

    fn place_line(&mut self, line: &Line, style: &ParagraphStyle) {
        if self.cursor - style.leading < self.geometry.margin_bottom && !self.at_page_top() {
            self.new_page();
        }
        let baseline = self.cursor - style.font_size;
        let mut x = match style.align {
            Align::Left => self.geometry.margin_left,
            Align::Center => {
                self.geometry.margin_left + (self.geometry.text_width() - line.width).max(0.0) / 2.0
            }
        };

        let Some(page) = self.pages.last_mut() else {
            return;
        };
        for (face, text) in &line.runs {
            page.runs.push(PlacedRun {
                x,
                y: baseline,
                face: *face,
                size: style.font_size,
                color: style.color,
                text: text.clone(),
            });
            x += get_metrics(*face).measure_str(text, style.font_size);
        }
        self.cursor -= style.leading;
    }
}

/// Lays out `blocks` top to bottom, opening pages as needed. Always returns at least one page.
pub fn layout_blocks(blocks: &[Block], geometry: &PageGeometry) -> Vec<PageLayout> {
    let mut flow = Flow::new(geometry);

    for block in blocks {
        match block {
            Block::Spacer(height) => flow.skip(*height),
            Block::Paragraph { spans, style } => {
                let lines = wrap_spans(spans, style.font_size, geometry.text_width());
                if lines.is_empty() {
                    continue;
                }
                flow.skip(style.space_before);
                for line in &lines {
                    flow.place_line(line, style);
                }
                flow.skip(style.space_after);
            }
        }
    }

    flow.pages
}
