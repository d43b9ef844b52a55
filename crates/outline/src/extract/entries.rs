// ABOUTME: Extraction of table-of-contents listings and the content targets they point at.
// ABOUTME: Covers both the toc1-toc4 convention and the separate appendix list/heading convention.

use ego_tree::NodeId;

use super::display_text;
use crate::dom::{Address, AddressBook, Document};

/// Class names of table-of-contents lines; the digit is the nesting level.
pub const TOC_CLASSES: &[&str] = &["toc1", "toc2", "toc3", "toc4"];
/// Class of appendix table-of-contents lines.
pub const APPENDIX_LIST_CLASS: &str = "appendixlist";
/// Class of the appendix lettering node that starts each appendix body.
pub const APPENDIX_CLASS: &str = "appendix";
/// Substring of bookmark ids Word places where a TOC heading's body begins.
pub const TOC_TARGET_MARKER: &str = "_Toc";

const APPENDIX_LEVEL: u8 = 4;

/// Which export convention produced a listing or target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    Toc,
    Appendix,
}

/// A table-of-contents line naming a section.
#[derive(Debug, Clone)]
pub struct TocListing {
    pub node: NodeId,
    pub address: Address,
    pub level: u8,
    pub text: String,
    pub page_number: Option<u32>,
    pub source: EntrySource,
    /// Index of the resolved target once linked.
    pub target: Option<usize>,
}

impl TocListing {
    pub fn new(node: NodeId, address: Address, level: u8, raw_text: &str, source: EntrySource) -> Self {
        let (text, page_number) = split_page_number(raw_text);
        Self {
            node,
            address,
            level,
            text,
            page_number,
            source,
            target: None,
        }
    }
}

/// The place in the body where a named section begins.
#[derive(Debug, Clone)]
pub struct ContentTarget {
    pub node: NodeId,
    pub address: Address,
    pub text: String,
    pub source: EntrySource,
    /// Index of the listing that names this target once linked.
    pub listing: Option<usize>,
}

impl ContentTarget {
    pub fn new(node: NodeId, address: Address, raw_text: &str, source: EntrySource) -> Self {
        Self {
            node,
            address,
            text: display_text(raw_text),
            source,
            listing: None,
        }
    }
}

/// Split a trailing all-digit token off a listing line as its page number.
pub fn split_page_number(raw: &str) -> (String, Option<u32>) {
    let cleaned = display_text(raw);
    match cleaned.rsplit_once(' ') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => {
            (head.to_string(), tail.parse().ok())
        }
        _ => (cleaned, None),
    }
}

fn is_toc_marker(id: &str) -> bool {
    id.contains(TOC_TARGET_MARKER)
}

fn toc_level(class: &str) -> Option<u8> {
    if !TOC_CLASSES.contains(&class) {
        return None;
    }
    class.chars().last()?.to_digit(10).map(|d| d as u8)
}

/// Every toc1..toc4 line in document order.
pub fn toc_listings(doc: &Document, book: &AddressBook) -> Vec<TocListing> {
    doc.find_by_class(|c| TOC_CLASSES.contains(&c))
        .into_iter()
        .filter_map(|id| {
            let level = doc.classes(id).into_iter().find_map(toc_level)?;
            let address = book.get(id)?.clone();
            Some(TocListing::new(id, address, level, &doc.text(id), EntrySource::Toc))
        })
        .collect()
}

/// Every appendix list line; appendix listings always sit at level 4.
pub fn appendix_listings(doc: &Document, book: &AddressBook) -> Vec<TocListing> {
    doc.find_by_class(|c| c == APPENDIX_LIST_CLASS)
        .into_iter()
        .filter_map(|id| {
            let address = book.get(id)?.clone();
            Some(TocListing::new(
                id,
                address,
                APPENDIX_LEVEL,
                &doc.text(id),
                EntrySource::Appendix,
            ))
        })
        .collect()
}

/// A marker is a structural placeholder when it and the marker right after it are both empty.
fn is_valid_target(doc: &Document, id: NodeId) -> bool {
    let Some(next) = doc.next_sibling(id) else {
        return true;
    };
    let next_is_marker = doc.attr(next, "id").is_some_and(is_toc_marker);
    !(next_is_marker && doc.text(id).is_empty() && doc.text(next).is_empty())
}

fn target_text(doc: &Document, id: NodeId) -> String {
    if let Some(parent) = doc.parent(id) {
        if parent != doc.root() {
            return doc.text(parent);
        }
    }
    if let Some(next) = doc.next_sibling(id) {
        let text = doc.text(next);
        if text.is_empty() {
            if let Some(after) = doc.next_sibling(next) {
                return doc.text(after);
            }
        }
        return text;
    }
    doc.text(id)
}

/// Every bookmark node whose id carries the TOC marker, minus empty placeholders.
pub fn content_targets(doc: &Document, book: &AddressBook) -> Vec<ContentTarget> {
    doc.find_by_attr("id", is_toc_marker)
        .into_iter()
        .filter(|id| is_valid_target(doc, *id))
        .filter_map(|id| {
            let address = book.get(id)?.clone();
            Some(ContentTarget::new(
                id,
                address,
                &target_text(doc, id),
                EntrySource::Toc,
            ))
        })
        .collect()
}

/// Every appendix lettering node; its title is the next sibling's text.
pub fn appendix_targets(doc: &Document, book: &AddressBook) -> Vec<ContentTarget> {
    doc.find_by_class(|c| c == APPENDIX_CLASS)
        .into_iter()
        .filter_map(|id| {
            let address = book.get(id)?.clone();
            let text = doc
                .next_sibling(id)
                .map(|next| doc.text(next))
                .unwrap_or_default();
            Some(ContentTarget::new(id, address, &text, EntrySource::Appendix))
        })
        .collect()
}
