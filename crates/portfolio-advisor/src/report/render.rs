//! PDF Rendering
//!
//! Lays a [`Report`] out onto fixed-size pages with greedy word wrapping and
//! writes it with the four standard Helvetica faces. Output depends only on
//! the report and layout, so the same input always yields the same bytes.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::document::{Paragraph, Report};
use super::markup::SpanStyle;
use super::metrics::{char_width, text_width, to_pdf_text};
use crate::error::RenderError;

/// Resource name and base font per style, indexed by [`font_index`]
const FONTS: [(&str, &str); 4] = [
    ("F1", "Helvetica"),
    ("F2", "Helvetica-Bold"),
    ("F3", "Helvetica-Oblique"),
    ("F4", "Helvetica-BoldOblique"),
];

const MAX_PAGES: usize = 10_000;

/// Page geometry and type settings, in points
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub font_size: f32,
    /// Baseline-to-baseline distance within a paragraph
    pub leading: f32,
    /// Extra space between paragraphs
    pub paragraph_spacing: f32,
}

impl Default for PageLayout {
    /// US Letter with 50pt margins and 10pt body text
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin_left: 50.0,
            margin_right: 50.0,
            margin_top: 50.0,
            margin_bottom: 50.0,
            font_size: 10.0,
            leading: 14.0,
            paragraph_spacing: 24.0,
        }
    }
}

impl PageLayout {
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        let values = [
            self.page_width,
            self.page_height,
            self.margin_left,
            self.margin_right,
            self.margin_top,
            self.margin_bottom,
            self.font_size,
            self.leading,
            self.paragraph_spacing,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RenderError::Layout("dimensions must be finite and non-negative".into()));
        }
        if self.font_size <= 0.0 || self.leading <= 0.0 {
            return Err(RenderError::Layout("font size and leading must be positive".into()));
        }
        if self.content_width() < self.font_size {
            return Err(RenderError::Layout(format!(
                "content width {:.1}pt is narrower than the font size",
                self.content_width()
            )));
        }
        if self.content_height() < self.leading {
            return Err(RenderError::Layout(format!(
                "content height {:.1}pt does not fit a single line",
                self.content_height()
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Fragment {
    text: String,
    style: SpanStyle,
}

#[derive(Clone, Debug, Default)]
struct Word {
    fragments: Vec<Fragment>,
    width: f32,
}

impl Word {
    fn push(&mut self, c: char, style: SpanStyle, size: f32) {
        append(&mut self.fragments, c, style);
        self.width += f32::from(char_width(c, style)) * size / 1000.0;
    }

    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Break a word wider than `max_width` into chunks that fit
    fn split(self, max_width: f32, size: f32) -> Vec<Self> {
        if self.width <= max_width {
            return vec![self];
        }
        let mut chunks = Vec::new();
        let mut chunk = Self::default();
        for fragment in self.fragments {
            for c in fragment.text.chars() {
                let advance = f32::from(char_width(c, fragment.style)) * size / 1000.0;
                if !chunk.is_empty() && chunk.width + advance > max_width {
                    chunks.push(std::mem::take(&mut chunk));
                }
                chunk.push(c, fragment.style, size);
            }
        }
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        chunks
    }
}

fn append(fragments: &mut Vec<Fragment>, c: char, style: SpanStyle) {
    match fragments.last_mut() {
        Some(last) if last.style == style => last.text.push(c),
        _ => fragments.push(Fragment {
            text: c.to_string(),
            style,
        }),
    }
}

#[derive(Clone, Debug, Default)]
struct Line {
    fragments: Vec<Fragment>,
    width: f32,
}

#[derive(Clone, Debug)]
struct PlacedLine {
    x: f32,
    y: f32,
    fragments: Vec<Fragment>,
}

fn words(paragraph: &Paragraph, size: f32) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word::default();
    for span in &paragraph.spans {
        for c in to_pdf_text(&span.text).chars() {
            if c == ' ' {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else {
                current.push(c, span.style, size);
            }
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Greedy fill: each line takes as many words as fit
fn wrap(paragraph: &Paragraph, max_width: f32, size: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::default();

    for word in words(paragraph, size).into_iter().flat_map(|w| w.split(max_width, size)) {
        if line.fragments.is_empty() {
            line.width = word.width;
            line.fragments = word.fragments;
            continue;
        }

        let space_style = line.fragments.last().map_or(SpanStyle::PLAIN, |f| f.style);
        let space = text_width(" ", space_style, size);
        if line.width + space + word.width > max_width {
            lines.push(std::mem::replace(
                &mut line,
                Line {
                    fragments: word.fragments,
                    width: word.width,
                },
            ));
            continue;
        }

        append(&mut line.fragments, ' ', space_style);
        for fragment in word.fragments {
            for c in fragment.text.chars() {
                append(&mut line.fragments, c, fragment.style);
            }
        }
        line.width += space + word.width;
    }

    if !line.fragments.is_empty() {
        lines.push(line);
    }
    lines
}

/// Place wrapped lines onto pages. Always yields at least one page.
fn paginate(report: &Report, layout: &PageLayout) -> Vec<Vec<PlacedLine>> {
    let top = layout.page_height - layout.margin_top;
    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let mut y = top;

    for (index, paragraph) in report.paragraphs.iter().enumerate() {
        if index > 0 {
            y -= layout.paragraph_spacing;
        }
        for line in wrap(paragraph, layout.content_width(), layout.font_size) {
            let mut baseline = y - layout.leading;
            let page_has_lines = pages.last().is_some_and(|p| !p.is_empty());
            if baseline < layout.margin_bottom && page_has_lines {
                pages.push(Vec::new());
                baseline = top - layout.leading;
            }
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    x: layout.margin_left,
                    y: baseline,
                    fragments: line.fragments,
                });
            }
            y = baseline;
        }
    }
    pages
}

const fn font_index(style: SpanStyle) -> usize {
    match (style.bold, style.italic) {
        (false, false) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (true, true) => 3,
    }
}

fn page_content(lines: &[PlacedLine], font_size: f32) -> Vec<u8> {
    let mut content = Content::new();
    for line in lines {
        content.begin_text();
        content.next_line(line.x, line.y);
        for fragment in &line.fragments {
            let (name, _) = FONTS[font_index(fragment.style)];
            content.set_font(Name(name.as_bytes()), font_size);
            content.show(Str(fragment.text.as_bytes()));
        }
        content.end_text();
    }
    content.finish()
}

/// Render `report` to PDF bytes
pub fn render(report: &Report, layout: &PageLayout) -> Result<Vec<u8>, RenderError> {
    layout.validate()?;

    let pages = paginate(report, layout);
    if pages.len() > MAX_PAGES {
        return Err(RenderError::Overflow(format!(
            "{} pages exceeds the limit of {MAX_PAGES}",
            pages.len()
        )));
    }
    let page_count = i32::try_from(pages.len()).map_err(|e| RenderError::Overflow(e.to_string()))?;

    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let font_ids: Vec<Ref> = (3..).take(FONTS.len()).map(Ref::new).collect();
    let first_page = 3 + 4;
    let page_ids: Vec<Ref> = (0..page_count).map(|i| Ref::new(first_page + 2 * i)).collect();
    let content_ids: Vec<Ref> = (0..page_count).map(|i| Ref::new(first_page + 2 * i + 1)).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id).kids(page_ids.iter().copied()).count(page_count);

    for (id, (_, base_font)) in font_ids.iter().zip(FONTS) {
        pdf.type1_font(*id).base_font(Name(base_font.as_bytes()));
    }

    for ((lines, page_id), content_id) in pages.iter().zip(&page_ids).zip(&content_ids) {
        {
            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, layout.page_width, layout.page_height));
            page.parent(tree_id);
            page.contents(*content_id);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for (id, (name, _)) in font_ids.iter().zip(FONTS) {
                fonts.pair(Name(name.as_bytes()), *id);
            }
        }
        pdf.stream(*content_id, &page_content(lines, layout.font_size));
    }

    let bytes = pdf.finish();
    debug!(pages = pages.len(), bytes = bytes.len(), "Rendered PDF report");
    Ok(bytes)
}
