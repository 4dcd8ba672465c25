pub mod html;
pub mod text;


use crate::crawlers::crawler::{Extracted, TextExtractor};
use crate::error::ParseError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Drops a leading UTF-8 byte order mark
pub fn strip_bom(body: &[u8]) -> &[u8] {
    body.strip_prefix(UTF8_BOM).unwrap_or(body)
}

/// The kinds of body the stock extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    Html,
    Text,
}

impl ParserType {
    /// Guesses the body type from its first non-whitespace bytes
    pub fn sniff(body: &[u8]) -> Self {
        let body = strip_bom(body);
        let start = body
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(body.len());
        let head = &body[start..body.len().min(start + 512)];
        let head = String::from_utf8_lossy(head).to_ascii_lowercase();

        if head.starts_with("<!doctype html")
            || head.starts_with("<html")
            || head.starts_with("<?xml")
            || head.contains("<head")
            || head.contains("<body")
            || (head.starts_with('<') && head.contains('>'))
        {
            ParserType::Html
        } else {
            ParserType::Text
        }
    }
}

/// Dispatches to the HTML or plain-text extractor based on the body
#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    html: html::HtmlExtractor,
    text: text::PlainTextExtractor,
}

impl ContentExtractor {
    pub fn with_text_options(options: text::TextOptions) -> Self {
        Self {
            html: html::HtmlExtractor,
            text: text::PlainTextExtractor::new(options),
        }
    }
}

impl TextExtractor for ContentExtractor {
    fn extract(&self, body: &[u8]) -> Result<Extracted, ParseError> {
        let parser_type = ParserType::sniff(body);
        ::log::trace!("Classified body as {:?}", parser_type);

        match parser_type {
            ParserType::Html => self.html.extract(body),
            ParserType::Text => self.text.extract(body),
        }
    }
}
