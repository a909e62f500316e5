//! Report Document
//!
//! The composed report: an ordered list of paragraphs, each a sequence of
//! styled spans. Built from the model's markup one line at a time.

use serde::{Deserialize, Serialize};

use super::markup::{Span, parse_inline, push_text};

/// One block of text, rendered with spacing before the next
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub spans: Vec<Span>,
}

impl Paragraph {
    pub const fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Parse a single markup line. Blank lines yield `None`.
    ///
    /// `#`-prefixed lines are headings: the hashes are stripped and the whole
    /// line is set bold.
    pub fn from_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let (content, heading) = match heading_text(trimmed) {
            Some(text) => (text, true),
            None => (trimmed, false),
        };
        if content.is_empty() {
            return None;
        }

        let spans = parse_inline(content);
        if !heading {
            return Some(Self::new(spans));
        }

        let mut merged = Vec::with_capacity(spans.len());
        for span in spans {
            let mut style = span.style;
            style.bold = true;
            push_text(&mut merged, &span.text, style);
        }
        Some(Self::new(merged))
    }

    /// Plain text with styling removed
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

fn heading_text(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches('#');
    if rest.len() == line.len() {
        return None;
    }
    // `#1 pick` is not a heading
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

/// A report ready to render
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub paragraphs: Vec<Paragraph>,
}

impl Report {
    pub const fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Split model output into paragraphs, one per non-blank line
    pub fn from_markup(text: &str) -> Self {
        Self::new(text.lines().filter_map(Paragraph::from_line).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}
