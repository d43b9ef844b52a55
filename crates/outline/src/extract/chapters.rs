// ABOUTME: Chapter recovery from level-1 headings: candidate extraction, pairwise merge, cleanup and exclusion.
// ABOUTME: Also recovers each chapter's printed page number from the master table of contents.

use tracing::{debug, warn};

use super::{collapse_whitespace, strip_footnote_markers};
use crate::dom::{Address, AddressBook, Document};
use crate::options::Options;

/// Survey boilerplate headings that must never become chapters.
pub const CHAPTER_TITLES_TO_EXCLUDE: &[&str] = &[
    "questions about the guide",
    "questions about you",
    "connecting with root & rebound",
    "any other comments/feedback",
    "follow-up survey contact information",
];

/// Exact text of the `<strong>` that introduces the master table of contents.
pub const MASTER_TOC_MARKER: &str = "MASTER TABLE OF CONTENTS";

/// A raw h1 before merging and cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterCandidate {
    pub text: String,
    pub address: Address,
}

/// A finalized chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub text: String,
    pub address: Address,
    pub page_number: Option<u32>,
}

/// Every h1 in document order, raw text preserved.
pub fn chapter_candidates(doc: &Document, book: &AddressBook) -> Vec<ChapterCandidate> {
    doc.find_by_tag("h1")
        .into_iter()
        .filter_map(|id| {
            Some(ChapterCandidate {
                text: doc.text(id),
                address: book.get(id)?.clone(),
            })
        })
        .collect()
}

fn are_same_chapter(a: &ChapterCandidate, b: &ChapterCandidate, distance: usize) -> bool {
    let gap = b
        .address
        .root_index()
        .saturating_sub(a.address.root_index());
    gap < distance || a.text.contains(&b.text) || b.text.contains(&a.text)
}

fn merge_two(a: &ChapterCandidate, b: &ChapterCandidate) -> ChapterCandidate {
    let text = if a.text.contains(&b.text) {
        b.text.clone()
    } else if b.text.contains(&a.text) {
        a.text.clone()
    } else {
        format!("{} {}", a.text, b.text)
    };
    ChapterCandidate {
        text,
        address: a.address.clone(),
    }
}

/// Merge adjacent candidates pairwise, left to right.
///
/// A merged pair is final: it is not considered again against the candidate
/// that follows it.
pub fn merge_adjacent(candidates: Vec<ChapterCandidate>, distance: usize) -> Vec<ChapterCandidate> {
    let mut merged = Vec::with_capacity(candidates.len());
    let mut pending: Option<ChapterCandidate> = None;
    for next in candidates {
        match pending.take() {
            Some(last) if are_same_chapter(&last, &next, distance) => {
                merged.push(merge_two(&last, &next));
            }
            Some(last) => {
                merged.push(last);
                pending = Some(next);
            }
            None => pending = Some(next),
        }
    }
    if let Some(last) = pending {
        merged.push(last);
    }
    merged
}

/// Drop footnote markers and anything from the first `(`, collapse
/// whitespace, and trim colons and whitespace from both ends.
pub fn clean_chapter_text(text: &str) -> String {
    let text = strip_footnote_markers(text);
    let head = text.split('(').next().unwrap_or("");
    collapse_whitespace(head)
        .trim_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}

pub fn is_excluded(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    lowered.is_empty()
        || CHAPTER_TITLES_TO_EXCLUDE
            .iter()
            .any(|title| lowered.contains(title))
}

/// Lines following the master TOC marker that mention a chapter or appendix.
///
/// Returns `None` when the document has no master TOC.
pub fn master_toc_lines(doc: &Document, window: usize) -> Option<Vec<String>> {
    let marker = doc
        .find_by_tag("strong")
        .into_iter()
        .find(|id| doc.text(*id).trim() == MASTER_TOC_MARKER)?;
    let start = doc.parent(marker)?;
    let mut lines = Vec::new();
    let mut current = doc.next_sibling(start);
    for _ in 0..window {
        let Some(id) = current else {
            break;
        };
        let text = doc.text(id);
        if text.contains("CHAPTER") || text.contains("APPENDIX") {
            lines.push(text);
        }
        current = doc.next_sibling(id);
    }
    Some(lines)
}

/// Page number of the first line containing the title's prefix up to `:`.
pub fn chapter_page_number(title: &str, lines: &[String]) -> Option<u32> {
    let upper = title.to_uppercase();
    let key = upper.split(':').next().unwrap_or("").trim();
    if key.is_empty() {
        return None;
    }
    lines
        .iter()
        .filter(|line| line.to_uppercase().contains(key))
        .find_map(|line| line.split_whitespace().last()?.parse().ok())
}

/// Extract, merge, clean, filter and page-number the document's chapters.
pub fn parse_chapters(doc: &Document, book: &AddressBook, opts: &Options) -> Vec<Chapter> {
    let candidates = chapter_candidates(doc, book);
    let merged = merge_adjacent(candidates, opts.chapter_merge_distance);
    let toc_lines = master_toc_lines(doc, opts.master_toc_window);
    if toc_lines.is_none() && !merged.is_empty() {
        warn!("no master table of contents; chapter page numbers left empty");
    }

    merged
        .into_iter()
        .filter_map(|candidate| {
            let text = clean_chapter_text(&candidate.text);
            if is_excluded(&text) {
                debug!(raw = %candidate.text, address = %candidate.address, "dropping chapter heading");
                return None;
            }
            let page_number = toc_lines
                .as_deref()
                .and_then(|lines| chapter_page_number(&text, lines));
            Some(Chapter {
                text,
                address: candidate.address,
                page_number,
            })
        })
        .collect()
}
