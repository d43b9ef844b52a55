// ABOUTME: DOM access, positional addressing and serialization for the flat export tree.
// ABOUTME: Wraps scraper's HTML tree behind an ordered-tree API keyed by ego_tree NodeIds.

//! DOM utilities for the flat export document.
//!
//! The export is parsed as a body fragment; the fragment's `<html>` element is
//! the document root and its children are the top-level nodes that content
//! ranges are sliced from.

pub mod address;
pub mod document;
pub mod serialize;

pub use address::{Address, AddressBook};
pub use document::Document;
