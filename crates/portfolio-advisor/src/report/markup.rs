//! Emphasis Markup
//!
//! Tolerant tokenizer for the `**bold**` / `*italic*` convention the model is
//! asked to write in. Delimiter runs pair up like a stack; anything that does
//! not pair (unmatched, crossing, or empty) stays literal text.
//!
//! A run can open when followed by non-whitespace and close when preceded by
//! non-whitespace, so bullet markers (`* item`) and arithmetic (`2 * 3`) are
//! left alone. `\*` is a literal asterisk.

use serde::{Deserialize, Serialize};

/// Inline text style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
}

impl SpanStyle {
    pub const PLAIN: Self = Self { bold: false, italic: false };
    pub const BOLD: Self = Self { bold: true, italic: false };
    pub const ITALIC: Self = Self { bold: false, italic: true };
    pub const BOLD_ITALIC: Self = Self { bold: true, italic: true };
}

/// A run of text in one style
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self { text: text.into(), style }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SpanStyle::PLAIN)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    const fn marker(self) -> &'static str {
        match self {
            Self::Bold => "**",
            Self::Italic => "*",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Literal,
    Open,
    Close,
}

#[derive(Debug)]
enum Token {
    Text(String),
    Delim { kind: Emphasis, role: Role },
}

/// Parse one line of markup into styled spans
pub fn parse_inline(line: &str) -> Vec<Span> {
    build_spans(&tokenize(line))
}

/// Re-emit `text` so every remaining `*` is either a matched marker or escaped
pub fn balance_emphasis(text: &str) -> String {
    text.split('\n')
        .map(|line| to_markup(&parse_inline(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize spans back to markup, escaping literal asterisks
pub fn to_markup(spans: &[Span]) -> String {
    let mut out = String::new();
    let mut current = SpanStyle::PLAIN;

    for span in spans {
        transition(&mut out, current, span.style);
        let mut chars = span.text.chars().peekable();
        while let Some(c) = chars.next() {
            let escape = match c {
                '*' => true,
                '\\' => matches!(chars.peek(), None | Some('*' | '\\')),
                _ => false,
            };
            if escape {
                out.push('\\');
            }
            out.push(c);
        }
        current = span.style;
    }
    transition(&mut out, current, SpanStyle::PLAIN);
    out
}

fn transition(out: &mut String, from: SpanStyle, to: SpanStyle) {
    if from.italic && !to.italic {
        out.push('*');
    }
    if from.bold && !to.bold {
        out.push_str("**");
    }
    if to.bold && !from.bold {
        out.push_str("**");
    }
    if to.italic && !from.italic {
        out.push('*');
    }
}

fn tokenize(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut openers: Vec<usize> = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if matches!(chars.get(i + 1), Some('*' | '\\')) => {
                text.push(chars[i + 1]);
                i += 2;
            }
            '*' => {
                let run = chars[i..].iter().take_while(|&&c| c == '*').count();
                let can_close = flanking(i.checked_sub(1).map(|j| chars[j]));
                let can_open = flanking(chars.get(i + run).copied());

                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                push_run(&mut tokens, &mut openers, run, can_open, can_close);
                i += run;
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

fn flanking(neighbour: Option<char>) -> bool {
    neighbour.is_some_and(|c| !c.is_whitespace())
}

/// Consume one delimiter run: close what it can, then open or stay literal
fn push_run(tokens: &mut Vec<Token>, openers: &mut Vec<usize>, run: usize, can_open: bool, can_close: bool) {
    let mut bold = run / 2;
    let mut italic = run % 2;

    while can_close && bold + italic > 0 {
        let Some(depth) = find_opener(tokens, openers, bold > 0, italic > 0) else {
            break;
        };
        let depth = lift_within_run(tokens, openers, depth);
        let opener = openers[depth];
        // Openers above the match would cross it; they stay literal
        openers.truncate(depth);

        let Token::Delim { kind, role } = &mut tokens[opener] else {
            break;
        };
        *role = Role::Open;
        let kind = *kind;
        tokens.push(Token::Delim { kind, role: Role::Close });

        match kind {
            Emphasis::Bold => bold -= 1,
            Emphasis::Italic => italic -= 1,
        }
    }

    let remaining = std::iter::repeat_n(Emphasis::Bold, bold).chain(std::iter::repeat_n(Emphasis::Italic, italic));
    for kind in remaining {
        if can_open {
            openers.push(tokens.len());
        }
        tokens.push(Token::Delim { kind, role: Role::Literal });
    }
}

/// Openers of one run may pair in either order: rotate the matched kind to
/// the top of the run so its siblings stay open. Returns the new depth.
fn lift_within_run(tokens: &mut [Token], openers: &[usize], depth: usize) -> usize {
    let top = openers.len() - 1;
    let (first, last) = (openers[depth], openers[top]);
    if depth == top || tokens[first..=last].iter().any(|t| matches!(t, Token::Text(_))) {
        return depth;
    }

    let mut kinds: Vec<Emphasis> = openers[depth..]
        .iter()
        .filter_map(|&i| match tokens[i] {
            Token::Delim { kind, .. } => Some(kind),
            Token::Text(_) => None,
        })
        .collect();
    kinds.rotate_left(1);
    for (&i, new_kind) in openers[depth..].iter().zip(kinds) {
        if let Token::Delim { kind, .. } = &mut tokens[i] {
            *kind = new_kind;
        }
    }
    top
}

/// Topmost opener of an available kind with text since it
fn find_opener(tokens: &[Token], openers: &[usize], bold: bool, italic: bool) -> Option<usize> {
    openers.iter().enumerate().rev().find_map(|(depth, &index)| {
        let available = match tokens[index] {
            Token::Delim { kind: Emphasis::Bold, .. } => bold,
            Token::Delim { kind: Emphasis::Italic, .. } => italic,
            Token::Text(_) => false,
        };
        let has_content = tokens[index + 1..].iter().any(|t| matches!(t, Token::Text(_)));
        (available && has_content).then_some(depth)
    })
}

fn build_spans(tokens: &[Token]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut bold_depth = 0usize;
    let mut italic_depth = 0usize;

    for token in tokens {
        let style = SpanStyle {
            bold: bold_depth > 0,
            italic: italic_depth > 0,
        };
        match token {
            Token::Text(text) => push_text(&mut spans, text, style),
            Token::Delim { kind, role: Role::Literal } => push_text(&mut spans, kind.marker(), style),
            Token::Delim { kind, role } => {
                let depth = match kind {
                    Emphasis::Bold => &mut bold_depth,
                    Emphasis::Italic => &mut italic_depth,
                };
                if *role == Role::Open {
                    *depth += 1;
                } else {
                    *depth = depth.saturating_sub(1);
                }
            }
        }
    }
    spans
}

/// Append text, merging with the previous span when the style matches
pub(crate) fn push_text(spans: &mut Vec<Span>, text: &str, style: SpanStyle) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => spans.push(Span::new(text, style)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_span_without_markers() {
        let spans = parse_inline("**Buy more AAPL**");
        assert_eq!(spans, vec![Span::new("Buy more AAPL", SpanStyle::BOLD)]);
    }

    #[test]
    fn test_mixed_bold_and_italic() {
        let spans = parse_inline("Trim **TSLA** and *rebalance* quarterly");
        assert_eq!(
            spans,
            vec![
                Span::plain("Trim "),
                Span::new("TSLA", SpanStyle::BOLD),
                Span::plain(" and "),
                Span::new("rebalance", SpanStyle::ITALIC),
                Span::plain(" quarterly"),
            ]
        );
    }

    #[test]
    fn test_nested_emphasis() {
        let spans = parse_inline("**Key: *hedge* now**");
        assert_eq!(
            spans,
            vec![
                Span::new("Key: ", SpanStyle::BOLD),
                Span::new("hedge", SpanStyle::BOLD_ITALIC),
                Span::new(" now", SpanStyle::BOLD),
            ]
        );
    }

    #[test]
    fn test_triple_markers_are_bold_italic() {
        assert_eq!(parse_inline("***Sell***"), vec![Span::new("Sell", SpanStyle::BOLD_ITALIC)]);
    }

    #[test]
    fn test_unmatched_markers_stay_literal() {
        assert_eq!(parse_inline("**Buy more AAPL"), vec![Span::plain("**Buy more AAPL")]);
        assert_eq!(parse_inline("half *open"), vec![Span::plain("half *open")]);
        assert_eq!(parse_inline("****"), vec![Span::plain("****")]);
    }

    #[test]
    fn test_bullets_and_arithmetic_are_not_emphasis() {
        assert_eq!(parse_inline("* Diversify"), vec![Span::plain("* Diversify")]);
        assert_eq!(parse_inline("2 * 3 * 4"), vec![Span::plain("2 * 3 * 4")]);
        assert_eq!(
            parse_inline("* **Cash**: 10%"),
            vec![Span::plain("* "), Span::new("Cash", SpanStyle::BOLD), Span::plain(": 10%")]
        );
    }

    #[test]
    fn test_crossing_markers_do_not_produce_crossed_spans() {
        let spans = parse_inline("**a *b** c*");
        assert_eq!(
            spans,
            vec![Span::new("a *b", SpanStyle::BOLD), Span::plain(" c*")]
        );
    }

    #[test]
    fn test_mixed_opening_run_closes_in_either_order() {
        assert_eq!(
            parse_inline("***a** b*"),
            vec![Span::new("a", SpanStyle::BOLD_ITALIC), Span::new(" b", SpanStyle::ITALIC)]
        );
        assert_eq!(
            parse_inline("***a* b**"),
            vec![Span::new("a", SpanStyle::BOLD_ITALIC), Span::new(" b", SpanStyle::BOLD)]
        );
    }

    #[test]
    fn test_escaped_asterisk() {
        assert_eq!(parse_inline(r"5\* rating"), vec![Span::plain("5* rating")]);
    }

    #[test]
    fn test_no_asterisks_left_in_styled_text() {
        for line in ["**Buy more AAPL**", "*a* **b** ***c***", "**x *y* z**"] {
            for span in parse_inline(line) {
                if span.style != SpanStyle::PLAIN {
                    assert!(!span.text.contains('*'), "{line:?} -> {span:?}");
                }
            }
        }
    }

    #[test]
    fn test_balance_escapes_only_stray_markers() {
        assert_eq!(balance_emphasis("**Buy** more *AAPL"), r"**Buy** more \*AAPL");
        assert_eq!(balance_emphasis("**ok**\n*fine*"), "**ok**\n*fine*");
    }

    #[test]
    fn test_balanced_markup_parses_to_same_spans() {
        for line in ["**Key: *hedge* now**", "**a** then *b*", "**a *b** c*", r"tail \"] {
            let original = parse_inline(line);
            assert_eq!(parse_inline(&to_markup(&original)), original, "{line:?}");
        }
    }
}
