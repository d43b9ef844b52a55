// ABOUTME: Main library entry point for the roadmap outline engine.
// ABOUTME: Re-exports the public API: Outliner, OutlinerBuilder, Outline, ContentItem, OutlineError, Options.

//! Roadmap outline - recovers a chapter/section hierarchy from a flat HTML export.
//!
//! The export encodes structure only through heading tags, table-of-contents
//! class names and document order. This crate addresses every node, links
//! table-of-contents listings to the body blocks they name, slices the flat
//! document into one content range per entry and re-attaches footnotes and
//! page references to the block that owns them.
//!
//! # Example
//!
//! ```no_run
//! use roadmap_outline::{ContentType, OutlineError, Outliner};
//!
//! fn main() -> Result<(), OutlineError> {
//!     let html = std::fs::read_to_string("raw_index.html").unwrap_or_default();
//!     let outliner = Outliner::builder().path_prefix("/guide").build();
//!     let outline = outliner.outline_html(&html)?;
//!     for record in outline.records(ContentType::Markdown) {
//!         println!("{} -> {}", record.title, record.path);
//!     }
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod dom;
pub mod error;
pub mod extract;
pub mod formats;
pub mod fragment;
pub mod hierarchy;
pub mod link;
pub mod options;
pub mod outliner;
pub mod record;
pub mod render;
pub mod resource;
pub mod slice;

pub use crate::dom::{Address, AddressBook, Document};
pub use crate::error::{ErrorCode, OutlineError};
pub use crate::fragment::Fragment;
pub use crate::hierarchy::{ContentItem, ItemKind, PageIndex};
pub use crate::options::{ContentType, FuzzyTieBreak, Options, OutlinerBuilder};
pub use crate::outliner::{Orphans, Outline, Outliner};
pub use crate::record::{records_to_json, ContentRecord};
pub use crate::render::{render_site, write_site, Page, SiteContext};
