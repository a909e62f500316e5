//! Report Module
//!
//! Turns model-written markup into a styled [`Report`] and renders it to PDF.

mod document;
mod markup;
mod metrics;
mod render;

pub use document::{Paragraph, Report};
pub use markup::{Span, SpanStyle, balance_emphasis, parse_inline, to_markup};
pub use metrics::{text_width, to_pdf_text};
pub use render::{PageLayout, render};
