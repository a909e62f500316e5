//! Font Metrics
//!
//! Advance widths for the standard Helvetica faces, in 1/1000 em, covering
//! printable ASCII. Oblique faces share the upright widths.

use super::markup::SpanStyle;

const FIRST: u32 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 222,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 278, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 278,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Width of `c` in 1/1000 em. Characters outside the table measure as `?`.
pub fn char_width(c: char, style: SpanStyle) -> u16 {
    let table = if style.bold { &HELVETICA_BOLD } else { &HELVETICA };
    let index = u32::from(c).checked_sub(FIRST).and_then(|i| usize::try_from(i).ok());
    match index.and_then(|i| table.get(i)) {
        Some(width) => *width,
        None => table[('?' as usize) - 32],
    }
}

/// Width of `text` in points at `size`
pub fn text_width(text: &str, style: SpanStyle, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, style))).sum();
    units as f32 * size / 1000.0
}

/// Map text onto the printable ASCII the standard fonts can show
pub fn to_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c),
            '\t' | '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' => out.push(' '),
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{2022}' | '\u{25CF}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{20AC}' => out.push_str("EUR"),
            '\u{00A3}' => out.push_str("GBP"),
            '\u{00D7}' => out.push('x'),
            c if c.is_control() => {}
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(char_width(' ', SpanStyle::PLAIN), 278);
        assert_eq!(char_width('W', SpanStyle::PLAIN), 944);
        assert_eq!(char_width('m', SpanStyle::BOLD), 889);
        assert_eq!(char_width('~', SpanStyle::BOLD), 584);
        assert_eq!(char_width('i', SpanStyle::ITALIC), char_width('i', SpanStyle::PLAIN));
    }

    #[test]
    fn test_bold_is_wider() {
        let plain = text_width("Portfolio Report", SpanStyle::PLAIN, 10.0);
        let bold = text_width("Portfolio Report", SpanStyle::BOLD, 10.0);
        assert!(bold > plain);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let w10 = text_width("AAPL", SpanStyle::PLAIN, 10.0);
        let w20 = text_width("AAPL", SpanStyle::PLAIN, 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-3);
        assert!((w10 - 25.57).abs() < 1e-3);
    }

    #[test]
    fn test_pdf_text_is_ascii() {
        let text = to_pdf_text("\u{201C}Buy\u{201D} \u{2014} it\u{2019}s 5\u{00A0}\u{20AC}\u{2026} \u{4E2D}");
        assert_eq!(text, "\"Buy\" - it's 5 EUR... ?");
        assert!(text.is_ascii());
    }
}
