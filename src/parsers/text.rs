use crate::crawlers::crawler::{Extracted, TextExtractor};
use crate::error::ParseError;
use crate::parsers::strip_bom;

/// Layout options for plain-text bodies
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Keep blank-line paragraph boundaries (as exactly one blank line)
    pub keep_paragraphs: bool,
    /// Keep single newlines inside a paragraph
    pub keep_line_breaks: bool,
    /// Collapse runs of spaces and tabs
    pub collapse_spaces: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            keep_paragraphs: true,
            keep_line_breaks: false,
            collapse_spaces: true,
        }
    }
}

/// Extracts text from `text/plain`-like bodies. Never yields links.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor {
    pub options: TextOptions,
}

impl PlainTextExtractor {
    pub fn new(options: TextOptions) -> Self {
        Self { options }
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, body: &[u8]) -> Result<Extracted, ParseError> {
        let text = std::str::from_utf8(strip_bom(body))
            .map_err(|e| ParseError::new(format!("body is not valid UTF-8: {}", e)))?;
        Ok(Extracted {
            title: None,
            text: format_text(text, &self.options),
            links: Vec::new(),
        })
    }
}

/// Collapses every run of whitespace (newlines included) to one space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Groups trimmed, non-empty lines into paragraphs separated by blank lines
pub fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

/// Lays out plain text according to `options`
pub fn format_text(text: &str, options: &TextOptions) -> String {
    let line_sep = if options.keep_line_breaks { "\n" } else { " " };
    let para_sep = if options.keep_paragraphs { "\n\n" } else { line_sep };

    paragraphs(text)
        .iter()
        .map(|para| {
            para.iter()
                .map(|line| {
                    if options.collapse_spaces {
                        collapse_whitespace(line)
                    } else {
                        line.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(line_sep)
        })
        .collect::<Vec<_>>()
        .join(para_sep)
}
