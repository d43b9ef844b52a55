// ABOUTME: The Outliner runs the whole reconstruction pipeline over one export document.
// ABOUTME: Outline holds the resulting item arena plus the page index and diagnostic counts.

use anyhow::anyhow;
use tracing::{debug, info};

use crate::annotate::annotate_item;
use crate::dom::{AddressBook, Document};
use crate::error::OutlineError;
use crate::extract::{
    appendix_listings, appendix_targets, content_targets, extract_footnotes, parse_chapters,
    toc_listings,
};
use crate::hierarchy::{build_items, ContentItem, PageIndex};
use crate::link::link_listings_to_targets;
use crate::options::{ContentType, Options, OutlinerBuilder};
use crate::record::{assign_paths, build_records, ContentRecord};
use crate::render::SiteContext;
use crate::slice::slice_content;

/// Counts of entries that took no part in the outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Orphans {
    /// Body positions no listing named.
    pub targets: usize,
    /// Listings with no matching body position.
    pub listings: usize,
}

/// A recovered outline.
#[derive(Debug, Clone)]
pub struct Outline {
    /// Items in document order; relationship fields index into this list.
    pub items: Vec<ContentItem>,
    pub page_index: PageIndex,
    /// Footnote definitions found in the document.
    pub footnotes_total: usize,
    pub orphans: Orphans,
    pub path_prefix: String,
}

impl Outline {
    pub fn chapters(&self) -> impl Iterator<Item = (usize, &ContentItem)> {
        self.items.iter().enumerate().filter(|(_, item)| item.is_chapter())
    }

    /// URL path of every item, in item order.
    pub fn paths(&self) -> Vec<String> {
        assign_paths(&self.items, &self.path_prefix)
    }

    /// One record per item with content in `content_type`.
    pub fn records(&self, content_type: ContentType) -> Vec<ContentRecord> {
        build_records(&self.items, &self.paths(), content_type)
    }

    /// Shared context for rendering this outline.
    pub fn site_context(&self) -> SiteContext {
        SiteContext {
            path_prefix: self.path_prefix.clone(),
            paths: self.paths(),
            chapters: self.chapters().map(|(i, _)| i).collect(),
            page_index: self.page_index.clone(),
        }
    }
}

/// Reconstructs outlines from export HTML.
#[derive(Debug, Clone, Default)]
pub struct Outliner {
    opts: Options,
}

impl Outliner {
    /// Create a new OutlinerBuilder for configuring the outliner.
    pub fn builder() -> OutlinerBuilder {
        OutlinerBuilder::new()
    }

    pub fn new(opts: Options) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Recover the outline of an export document.
    ///
    /// Only an empty document is an error; anything that cannot be placed in
    /// the outline is skipped.
    pub fn outline_html(&self, html: &str) -> Result<Outline, OutlineError> {
        if html.trim().is_empty() {
            return Err(OutlineError::parse(
                "",
                "outline_html",
                Some(anyhow!("document is empty")),
            ));
        }

        let mut doc = Document::parse(html);
        let footnotes = extract_footnotes(&mut doc);
        let book = AddressBook::build(&doc);
        debug!(nodes = book.len(), footnotes = footnotes.len(), "addressed document");

        let chapters = parse_chapters(&doc, &book, &self.opts);

        let mut targets = content_targets(&doc, &book);
        targets.extend(appendix_targets(&doc, &book));
        let mut listings = toc_listings(&doc, &book);
        listings.extend(appendix_listings(&doc, &book));
        let report = link_listings_to_targets(&mut listings, &mut targets, &self.opts);

        let mut items = build_items(&chapters, &listings, &targets);
        let page_index = PageIndex::build(&items);
        slice_content(&doc, &mut items);

        let mut cited = 0;
        let mut page_links = 0;
        for item in items.iter_mut() {
            let annotation = annotate_item(&mut doc, item, &footnotes, &self.opts.path_prefix);
            cited += annotation.footnotes;
            page_links += annotation.page_links;
        }

        info!(
            chapters = chapters.len(),
            items = items.len(),
            linked = report.linked,
            orphan_targets = report.orphan_targets,
            orphan_listings = report.orphan_listings,
            footnotes = footnotes.len(),
            cited,
            page_links,
            "outline recovered"
        );

        Ok(Outline {
            items,
            page_index,
            footnotes_total: footnotes.len(),
            orphans: Orphans {
                targets: report.orphan_targets,
                listings: report.orphan_listings,
            },
            path_prefix: self.opts.path_prefix.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_a_parse_error() {
        let err = Outliner::default().outline_html("  \n ").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn plain_chapters_become_items() {
        let outline = Outliner::default()
            .outline_html("<h1>Money</h1><p>Save.</p><p>x</p><p>y</p><h1>Health</h1><p>Rest.</p>")
            .unwrap();
        let titles: Vec<_> = outline.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Money", "Health"]);
        assert_eq!(outline.paths(), vec!["/money", "/health"]);
        assert_eq!(outline.orphans, Orphans::default());
    }
}
