// ABOUTME: Content converters used when serializing items as markdown or plain text.
// ABOUTME: Markdown goes through htmd; plain text is gathered from scraper text nodes.

use ego_tree::iter::Edge;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::options::ContentType;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

fn preprocess_br_tags(html: &str) -> String {
    BR_RE.replace_all(html, "\n").into_owned()
}

/// Convert HTML to Markdown using htmd.
///
/// Blank-line runs are capped at two. On conversion error the input is
/// returned unchanged.
pub fn html_to_markdown(html: &str) -> String {
    let preprocessed = preprocess_br_tags(html);
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();
    let md = converter
        .convert(&preprocessed)
        .unwrap_or_else(|_| preprocessed.clone());
    BLANK_LINES_RE.replace_all(&md, "\n\n").trim().to_string()
}

/// Elements whose end starts a new line of plain text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ol", "ul", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "blockquote", "section", "article", "pre",
];

/// Convert HTML to plain text, one line per block or line break.
pub fn html_to_text(html: &str) -> String {
    let preprocessed = preprocess_br_tags(html);
    let fragment = Html::parse_fragment(&preprocessed);
    let mut raw = String::new();
    for edge in fragment.root_element().traverse() {
        match edge {
            Edge::Open(node) => {
                if let Some(text) = node.value().as_text() {
                    raw.push_str(text);
                }
            }
            Edge::Close(node) => {
                if let Some(el) = node.value().as_element() {
                    if BLOCK_TAGS.contains(&el.name()) {
                        raw.push('\n');
                    }
                }
            }
        }
    }
    let normalized = HSPACE_RE.replace_all(&raw, " ");
    let collapsed = NEWLINES_RE.replace_all(&normalized, "\n");
    collapsed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `html` in the requested content type.
pub fn convert(html: &str, content_type: ContentType) -> String {
    match content_type {
        ContentType::Html => html.to_string(),
        ContentType::Markdown => html_to_markdown(html),
        ContentType::Text => html_to_text(html),
    }
}
