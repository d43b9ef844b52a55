// ABOUTME: Per-item content rewriting: footnote reattachment, redundant heading removal, page links.
// ABOUTME: Turns an item's sliced nodes into owned fragments the renderer and serializer consume.

use std::cmp::Ordering;

use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::Node;
use tracing::warn;

use crate::dom::Document;
use crate::extract::footnotes::{footnote_number, is_footnote_ref_id};
use crate::extract::FootnoteIndex;
use crate::fragment::Fragment;
use crate::hierarchy::ContentItem;

static PAGE_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"PG\.?\s+(\d+)").unwrap());

/// Classes that mark an appendix title block rather than body text.
const APPENDIX_TITLE_CLASSES: &[&str] = &["appendixtitle", "appendixtocheading"];
const APPENDIX_LETTER_CLASS: &str = "appendix";

/// How many leading fragments may repeat the item's title.
const HEADING_WINDOW: usize = 2;

/// What annotation did to one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Annotation {
    pub footnotes: usize,
    pub missing_footnotes: usize,
    pub headings_removed: usize,
    pub page_links: usize,
}

/// Run every annotation step on `item`, filling `item.content`.
pub fn annotate_item(
    doc: &mut Document,
    item: &mut ContentItem,
    footnotes: &FootnoteIndex,
    path_prefix: &str,
) -> Annotation {
    let mut report = Annotation::default();
    let numbers = renumber_footnote_refs(doc, &item.nodes);

    item.content = item
        .nodes
        .iter()
        .filter(|id| !is_blank_text(doc, **id))
        .map(|id| Fragment::from_node(doc, *id))
        .collect();

    let mut resolved = String::new();
    for number in &numbers {
        match footnotes.get(number) {
            Some(html) => {
                resolved.push_str(html);
                report.footnotes += 1;
            }
            None => {
                warn!(footnote = %number, item = %item.title, "footnote reference without definition");
                report.missing_footnotes += 1;
            }
        }
    }
    if !resolved.is_empty() {
        item.content.push(Fragment::parse(&format!(
            r#"<ol class="footnotes">{}</ol>"#,
            resolved
        )));
    }

    report.headings_removed = remove_redundant_headings(&mut item.content, &item.title);
    report.page_links = link_page_refs(&mut item.content, path_prefix);
    report
}

fn is_blank_text(doc: &Document, id: NodeId) -> bool {
    doc.node(id)
        .and_then(|n| n.value().as_text().map(|t| t.trim().is_empty()))
        .unwrap_or(false)
}

/// Rewrite every footnote citation under `nodes` to `[n]` and return the
/// cited numbers, de-duplicated and in numeric order.
///
/// A citation wrapped in two `<sup>` levels is hoisted into the outer one.
pub fn renumber_footnote_refs(doc: &mut Document, nodes: &[NodeId]) -> Vec<String> {
    let refs: Vec<NodeId> = nodes
        .iter()
        .flat_map(|node| doc.descendants(*node))
        .filter(|id| doc.is_tag(*id, "a") && doc.attr(*id, "id").is_some_and(is_footnote_ref_id))
        .collect();

    let mut numbers = Vec::with_capacity(refs.len());
    for id in refs {
        let Some(number) = doc.attr(id, "id").map(|raw| footnote_number(raw).to_string()) else {
            continue;
        };
        doc.set_text(id, &format!("[{}]", number));
        if let Some(parent) = doc.parent(id).filter(|p| doc.is_tag(*p, "sup")) {
            if let Some(outer) = doc.parent(parent).filter(|g| doc.is_tag(*g, "sup")) {
                doc.move_to_front(outer, id);
                doc.detach(parent);
            }
        }
        numbers.push(number);
    }
    numbers.sort_by(|a, b| footnote_order(a, b));
    numbers.dedup();
    numbers
}

/// Numeric footnotes first in numeric order, anything else after in text order.
fn footnote_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn is_redundant(fragment: &Fragment, title: &str) -> bool {
    let class = fragment.class.as_deref();
    if class == Some(APPENDIX_LETTER_CLASS) {
        return true;
    }
    let titled = fragment.is_heading() || class.is_some_and(|c| APPENDIX_TITLE_CLASSES.contains(&c));
    titled && !title.is_empty() && fragment.text.to_lowercase().contains(title)
}

/// Drop leading fragments that only repeat the item's title.
pub fn remove_redundant_headings(content: &mut Vec<Fragment>, title: &str) -> usize {
    let title = title.to_lowercase();
    let window = content.len().min(HEADING_WINDOW);
    let doomed: Vec<usize> = (0..window)
        .filter(|i| is_redundant(&content[*i], &title))
        .collect();
    for i in doomed.iter().rev() {
        content.remove(*i);
    }
    doomed.len()
}

fn inside_link(node: NodeRef<'_, Node>) -> bool {
    node.ancestors()
        .any(|a| a.value().as_element().is_some_and(|el| el.name() == "a"))
}

/// Wrap `PG 12` style references in links to the page index.
///
/// Only text outside existing links is rewritten; attribute values are
/// never touched.
pub fn link_page_refs(content: &mut [Fragment], path_prefix: &str) -> usize {
    let mut count = 0;
    for fragment in content.iter_mut() {
        if !PAGE_REF_RE.is_match(&fragment.text) {
            continue;
        }
        let doc = Document::parse(&fragment.html);
        let before = count;
        let html = doc.inner_html_mapped(doc.root(), |node, escaped| {
            if inside_link(node) {
                return escaped;
            }
            PAGE_REF_RE
                .replace_all(&escaped, |caps: &Captures| {
                    count += 1;
                    format!(
                        r#"<a class="page_link" href="{}/page-index/#page_{}">{}</a>"#,
                        path_prefix, &caps[1], &caps[0]
                    )
                })
                .into_owned()
        });
        if count > before {
            *fragment = Fragment::parse(&html);
        }
    }
    count
}
