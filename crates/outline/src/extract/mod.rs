// ABOUTME: Extraction passes over the addressed export: TOC listings, content targets, chapters, footnotes.
// ABOUTME: Also holds the text normalization helpers shared by every pass.

//! Candidate extraction.
//!
//! Each pass is independent and reads the tree through [`Document`] and the
//! precomputed [`AddressBook`]. Only footnote extraction mutates the tree, and
//! it runs before addresses are computed.
//!
//! [`Document`]: crate::dom::Document
//! [`AddressBook`]: crate::dom::AddressBook

pub mod chapters;
pub mod entries;
pub mod footnotes;

use once_cell::sync::Lazy;
use regex::Regex;

pub use chapters::{parse_chapters, Chapter, ChapterCandidate};
pub use entries::{
    appendix_listings, appendix_targets, content_targets, toc_listings, ContentTarget,
    EntrySource, TocListing,
};
pub use footnotes::{extract_footnotes, FootnoteIndex};

static FOOTNOTE_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

/// Remove bracketed footnote markers such as `[12]`.
pub fn strip_footnote_markers(text: &str) -> String {
    FOOTNOTE_MARKER_RE.replace_all(text, "").into_owned()
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Display text as used for matching listings against targets.
pub fn display_text(raw: &str) -> String {
    collapse_whitespace(&strip_footnote_markers(raw))
}
