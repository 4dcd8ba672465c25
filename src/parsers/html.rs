use crate::crawlers::crawler::{Extracted, TextExtractor};
use crate::error::ParseError;
use crate::parsers::strip_bom;
use crate::parsers::text::collapse_whitespace;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Extracts title, visible text and links from an HTML document
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor;

impl TextExtractor for HtmlExtractor {
    fn extract(&self, body: &[u8]) -> Result<Extracted, ParseError> {
        let html = std::str::from_utf8(strip_bom(body))
            .map_err(|e| ParseError::new(format!("body is not valid UTF-8: {}", e)))?;
        Ok(parse(html))
    }
}

/// Parses HTML content into title, text and raw link targets
pub fn parse(html: &str) -> Extracted {
    let doc = Html::parse_document(html);

    let extracted = Extracted {
        title: parse_title(&doc),
        text: parse_text(&doc),
        links: parse_links(&doc),
    };

    ::log::debug!("HTML parser found {} links", extracted.links.len());
    if !extracted.links.is_empty() {
        ::log::trace!(
            "First few links: {:?}",
            extracted.links.iter().take(5).collect::<Vec<_>>()
        );
    }

    extracted
}

fn parse_title(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    doc.select(&selector)
        .next()
        .map(|title| collapse_whitespace(&title.text().collect::<String>()))
        .filter(|title| !title.is_empty())
}

/// Visible text of the body (or the whole document when there is no body)
fn parse_text(doc: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| doc.select(&selector).next())
        .unwrap_or_else(|| doc.root_element());

    let mut pieces = Vec::new();
    collect_visible_text(root, &mut pieces);
    collapse_whitespace(&pieces.join(" "))
}

fn collect_visible_text<'a>(element: ElementRef<'a>, pieces: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => pieces.push(&**text),
            Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_visible_text(child_element, pieces);
                }
            }
            _ => {}
        }
    }
}

fn parse_links(doc: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|e| e.value().attr("href"))
        .map(str::trim)
        .filter(|href| {
            !(href.is_empty()
                || href.starts_with('#')
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
                || href.starts_with("javascript:"))
        })
        .map(str::to_string)
        .collect()
}
