//! Renders the markup subset assistant replies are allowed to use.
//!
//! The prompt asks the model for a small set of HTML tags; this module turns
//! that subset into styled terminal lines. Tags outside the allow list are
//! stripped while their inner text is kept, so replies are never rendered as
//! trusted markup.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::prompt::ALLOWED_TAGS;

enum Token<'a> {
    Text(&'a str),
    Open(String),
    Close(String),
}

struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.rest.is_empty() {
            return None;
        }

        if let Some(stripped) = self.rest.strip_prefix('<') {
            if let Some(end) = stripped.find('>') {
                let inner = &stripped[..end];
                self.rest = &stripped[end + 1..];
                let closing = inner.starts_with('/');
                let inner = inner.trim_start_matches('/').trim_end_matches('/');
                // Tag name only; attributes are dropped.
                let name = inner
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_lowercase();
                return Some(if closing {
                    Token::Close(name)
                } else {
                    Token::Open(name)
                });
            }
            // Unterminated '<' is literal text.
            self.rest = "";
            return Some(Token::Text(stripped));
        }

        let end = self.rest.find('<').unwrap_or(self.rest.len());
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Token::Text(text))
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

enum ListKind {
    Unordered,
    Ordered(u32),
}

struct Renderer {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    base: Style,
    bold: usize,
    emphasis: usize,
    heading: bool,
    lists: Vec<ListKind>,
}

impl Renderer {
    fn new(base: Style) -> Self {
        Self {
            lines: Vec::new(),
            spans: Vec::new(),
            base,
            bold: 0,
            emphasis: 0,
            heading: false,
            lists: Vec::new(),
        }
    }

    fn current_style(&self) -> Style {
        let mut style = self.base;
        if self.bold > 0 || self.heading {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.emphasis > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }

    fn flush(&mut self, force: bool) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        } else if force {
            self.lines.push(Line::default());
        }
    }

    /// Blank line before a new block, unless we're at the very top.
    fn block_break(&mut self) {
        self.flush(false);
        if !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
    }

    fn push_text(&mut self, text: &str) {
        let style = self.current_style();
        let decoded = decode_entities(text);
        let mut first = true;
        for segment in decoded.split('\n') {
            if !first {
                self.flush(true);
            }
            first = false;
            if !segment.is_empty() {
                self.spans.push(Span::styled(segment.to_string(), style));
            }
        }
    }

    fn list_marker(&mut self) -> String {
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        match self.lists.last_mut() {
            Some(ListKind::Unordered) | None => format!("{indent}• "),
            Some(ListKind::Ordered(counter)) => {
                let marker = format!("{indent}{counter}. ");
                *counter += 1;
                marker
            }
        }
    }

    fn open(&mut self, tag: &str) {
        match tag {
            "p" | "table" => self.block_break(),
            "h3" => {
                self.block_break();
                self.heading = true;
            }
            "br" => self.flush(true),
            "ul" => {
                self.flush(false);
                self.lists.push(ListKind::Unordered);
            }
            "ol" => {
                self.flush(false);
                self.lists.push(ListKind::Ordered(1));
            }
            "li" => {
                self.flush(false);
                let marker = self.list_marker();
                let style = self.current_style();
                self.spans.push(Span::styled(marker, style));
            }
            "tr" => self.flush(false),
            "td" | "th" => {
                if !self.spans.is_empty() {
                    self.spans.push(Span::raw("  "));
                }
            }
            "strong" => self.bold += 1,
            "em" => self.emphasis += 1,
            _ => {}
        }
    }

    fn close(&mut self, tag: &str) {
        match tag {
            "p" | "li" | "tr" | "table" => self.flush(false),
            "h3" => {
                self.flush(false);
                self.heading = false;
            }
            "ul" | "ol" => {
                self.flush(false);
                self.lists.pop();
            }
            "strong" => self.bold = self.bold.saturating_sub(1),
            "em" => self.emphasis = self.emphasis.saturating_sub(1),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush(false);
        self.lines
    }
}

fn is_allowed(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

/// Render assistant reply markup into styled lines using `base` for plain
/// text. Disallowed tags are stripped, their content kept.
pub fn render_lines(text: &str, base: Style) -> Vec<Line<'static>> {
    let mut renderer = Renderer::new(base);
    for token in Tokenizer::new(text) {
        match token {
            Token::Text(text) => renderer.push_text(text),
            Token::Open(tag) if is_allowed(&tag) => renderer.open(&tag),
            Token::Close(tag) if is_allowed(&tag) => renderer.close(&tag),
            Token::Open(_) | Token::Close(_) => {}
        }
    }
    renderer.finish()
}

/// Plain-text version of a reply, for speech output and one-shot CLI mode.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::new();
    for token in Tokenizer::new(text) {
        match token {
            Token::Text(text) => out.push_str(&decode_entities(text)),
            Token::Open(tag) | Token::Close(tag) => match tag.as_str() {
                "p" | "br" | "li" | "h3" | "tr" => {
                    if !out.ends_with('\n') && !out.is_empty() {
                        out.push('\n');
                    }
                }
                "td" | "th" => {
                    if !out.ends_with(char::is_whitespace) && !out.is_empty() {
                        out.push(' ');
                    }
                }
                _ => {}
            },
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn paragraphs_become_separate_blocks() {
        let lines = render_lines("<p>First</p><p>Second</p>", Style::default());
        assert_eq!(text_of(&lines), vec!["First", "", "Second"]);
    }

    #[test]
    fn strong_text_is_bold() {
        let lines = render_lines("<p>be <strong>kind</strong></p>", Style::default());
        let line = &lines[0];
        assert_eq!(line.spans[0].content.as_ref(), "be ");
        assert_eq!(line.spans[1].content.as_ref(), "kind");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn unordered_list_gets_bullets() {
        let lines = render_lines("<ul><li>breathe</li><li>rest</li></ul>", Style::default());
        assert_eq!(text_of(&lines), vec!["• breathe", "• rest"]);
    }

    #[test]
    fn ordered_list_counts_items() {
        let lines = render_lines("<ol><li>inhale</li><li>exhale</li></ol>", Style::default());
        assert_eq!(text_of(&lines), vec!["1. inhale", "2. exhale"]);
    }

    #[test]
    fn disallowed_tags_are_stripped_but_text_kept() {
        let lines = render_lines(
            "<p><script>alert(1)</script>stay safe</p>",
            Style::default(),
        );
        assert_eq!(text_of(&lines), vec!["alert(1)stay safe"]);
    }

    #[test]
    fn entities_are_decoded() {
        let lines = render_lines("<p>you &amp; me &lt;3</p>", Style::default());
        assert_eq!(text_of(&lines), vec!["you & me <3"]);
    }

    #[test]
    fn br_breaks_line() {
        let lines = render_lines("<p>one<br>two</p>", Style::default());
        assert_eq!(text_of(&lines), vec!["one", "two"]);
    }

    #[test]
    fn strip_markup_flattens_to_plain_text() {
        let text = strip_markup("<h3>Hello</h3><p>You are <strong>enough</strong>. 😊</p>");
        assert_eq!(text, "Hello\nYou are enough. 😊");
    }

    #[test]
    fn plain_text_passes_through() {
        let lines = render_lines("just words", Style::default());
        assert_eq!(text_of(&lines), vec!["just words"]);
        assert_eq!(strip_markup("just words"), "just words");
    }
}
