// ABOUTME: Serializable per-item records and the URL paths every item is published under.
// ABOUTME: Records flatten the item arena into paths so downstream consumers need no indexes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::OutlineError;
use crate::formats;
use crate::fragment::join_html;
use crate::hierarchy::{ContentItem, ItemKind};
use crate::options::ContentType;

/// One content item as handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub title: String,
    pub kind: ItemKind,
    pub level: u8,
    /// Dotted, zero-padded position in the source document.
    pub address: String,
    pub page_number: Option<u32>,
    pub path: String,
    pub parent: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub children: Vec<String>,
    pub content: String,
}

/// Lowercase the title and collapse every run of non-alphanumerics to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("item");
    }
    slug
}

/// URL path of every item, in item order.
///
/// Items without a parent sit directly under the prefix; others nest under
/// their parent's path. Repeated paths get `-2`, `-3` and so on.
pub fn assign_paths(items: &[ContentItem], prefix: &str) -> Vec<String> {
    let prefix = prefix.trim_end_matches('/');
    let mut used: HashSet<String> = HashSet::new();
    let mut paths: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let base = match item.parent.and_then(|p| paths.get(p)) {
            Some(parent_path) => format!("{}/{}", parent_path, slugify(&item.title)),
            None => format!("{}/{}", prefix, slugify(&item.title)),
        };
        let mut path = base.clone();
        let mut n = 2;
        while used.contains(&path) {
            path = format!("{}-{}", base, n);
            n += 1;
        }
        used.insert(path.clone());
        paths.push(path);
    }
    paths
}

/// Flatten items into records, converting content to `content_type`.
pub fn build_records(
    items: &[ContentItem],
    paths: &[String],
    content_type: ContentType,
) -> Vec<ContentRecord> {
    let path_of = |idx: Option<usize>| idx.and_then(|i| paths.get(i)).cloned();
    items
        .iter()
        .enumerate()
        .map(|(i, item)| ContentRecord {
            title: item.title.clone(),
            kind: item.kind,
            level: item.level,
            address: item.address.to_string(),
            page_number: item.page_number,
            path: paths.get(i).cloned().unwrap_or_default(),
            parent: path_of(item.parent),
            prev: path_of(item.prev),
            next: path_of(item.next),
            children: item
                .children
                .iter()
                .filter_map(|c| paths.get(*c).cloned())
                .collect(),
            content: formats::convert(&join_html(&item.content), content_type),
        })
        .collect()
}

/// Serialize records as a JSON array.
pub fn records_to_json(records: &[ContentRecord], pretty: bool) -> Result<String, OutlineError> {
    let out = if pretty {
        serde_json::to_string_pretty(records)
    } else {
        serde_json::to_string(records)
    };
    out.map_err(|e| OutlineError::serialize("", "records_to_json", Some(e.into())))
}
