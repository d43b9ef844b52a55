// ABOUTME: Builds the ordered content-item arena from chapters and linked TOC listings.
// ABOUTME: Parent, previous, next and children are resolved as indexes after all items exist.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use ego_tree::NodeId;
use serde::{Deserialize, Serialize};

use crate::dom::Address;
use crate::extract::{Chapter, ContentTarget, EntrySource, TocListing};
use crate::fragment::Fragment;

/// Marker that turns any entry into an appendix container.
pub const APPENDIX_MARKER: &str = "APPENDIX";

/// What an item is within the recovered outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Chapter,
    Section,
    Subsection,
    Topic,
    Subtopic,
    /// A top-level container whose title names an appendix.
    ChapterAppendix,
    /// One appendix from the appendix list.
    SingleAppendix,
}

impl ItemKind {
    /// Kind for an ordinary entry at `level`.
    pub fn for_level(level: u8) -> Self {
        match level {
            0 => ItemKind::Chapter,
            1 => ItemKind::Section,
            2 => ItemKind::Subsection,
            3 => ItemKind::Topic,
            _ => ItemKind::Subtopic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Chapter => "chapter",
            ItemKind::Section => "section",
            ItemKind::Subsection => "subsection",
            ItemKind::Topic => "topic",
            ItemKind::Subtopic => "subtopic",
            ItemKind::ChapterAppendix => "chapter_appendix",
            ItemKind::SingleAppendix => "single_appendix",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the recovered outline.
///
/// Relationship fields are indexes into the owning item list.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub title: String,
    pub kind: ItemKind,
    /// 0 for chapters, 1 to 4 for nested sections.
    pub level: u8,
    pub address: Address,
    pub page_number: Option<u32>,
    /// Top-level node indexes this item owns.
    pub range: Range<usize>,
    /// Top-level nodes in `range`, set by the slicer.
    pub nodes: Vec<NodeId>,
    /// Owned content, set by the annotator.
    pub content: Vec<Fragment>,
    pub parent: Option<usize>,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub children: Vec<usize>,
}

impl ContentItem {
    fn new(title: String, kind: ItemKind, level: u8, address: Address, page_number: Option<u32>) -> Self {
        Self {
            title,
            kind,
            level,
            address,
            page_number,
            range: 0..0,
            nodes: Vec::new(),
            content: Vec::new(),
            parent: None,
            prev: None,
            next: None,
            children: Vec::new(),
        }
    }

    pub fn is_chapter(&self) -> bool {
        self.level == 0
    }
}

fn kind_for(title: &str, level: u8, source: Option<EntrySource>) -> ItemKind {
    if source == Some(EntrySource::Appendix) {
        ItemKind::SingleAppendix
    } else if title.contains(APPENDIX_MARKER) {
        ItemKind::ChapterAppendix
    } else {
        ItemKind::for_level(level)
    }
}

/// Build the address-ordered item list with relationships resolved.
///
/// Only listings linked to a target contribute; the item sits at the
/// target's address since that is where its body starts.
pub fn build_items(
    chapters: &[Chapter],
    listings: &[TocListing],
    targets: &[ContentTarget],
) -> Vec<ContentItem> {
    let mut items: Vec<ContentItem> = chapters
        .iter()
        .map(|chapter| {
            ContentItem::new(
                chapter.text.clone(),
                kind_for(&chapter.text, 0, None),
                0,
                chapter.address.clone(),
                chapter.page_number,
            )
        })
        .collect();

    for listing in listings {
        let Some(target) = listing.target.and_then(|ti| targets.get(ti)) else {
            continue;
        };
        items.push(ContentItem::new(
            listing.text.clone(),
            kind_for(&listing.text, listing.level, Some(listing.source)),
            listing.level,
            target.address.clone(),
            listing.page_number,
        ));
    }

    items.sort_by(|a, b| a.address.cmp(&b.address));
    link_relations(&mut items);
    items
}

/// Resolve parent, prev, next and children for items already in address order.
pub fn link_relations(items: &mut [ContentItem]) {
    let len = items.len();
    for i in 0..len {
        let level = items[i].level;
        let parent = (0..i).rev().find(|&j| items[j].level < level);
        let prev = (0..i).rev().find(|&j| items[j].level <= level);
        let item = &mut items[i];
        item.parent = parent;
        item.prev = prev;
        item.next = (i + 1 < len).then_some(i + 1);
        item.children.clear();
    }
    for i in 0..len {
        if let Some(parent) = items[i].parent {
            items[parent].children.push(i);
        }
    }
}

/// Item indexes grouped by printed page number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageIndex(BTreeMap<u32, Vec<usize>>);

impl PageIndex {
    pub fn build(items: &[ContentItem]) -> Self {
        let mut pages: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, item) in items.iter().enumerate() {
            if let Some(page) = item.page_number {
                pages.entry(page).or_default().push(i);
            }
        }
        Self(pages)
    }

    pub fn get(&self, page: u32) -> &[usize] {
        self.0.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[usize])> {
        self.0.iter().map(|(page, items)| (*page, items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use pretty_assertions::assert_eq;

    fn chapter(text: &str, root: usize, page: Option<u32>) -> Chapter {
        Chapter {
            text: text.to_string(),
            address: Address::new(vec![root]),
            page_number: page,
        }
    }

    fn linked(
        listings: &mut Vec<TocListing>,
        targets: &mut Vec<ContentTarget>,
        text: &str,
        level: u8,
        at: usize,
        source: EntrySource,
    ) {
        let node = Document::parse("").root();
        let mut listing = TocListing::new(node, Address::new(vec![0, listings.len()]), level, text, source);
        let target = ContentTarget::new(node, Address::new(vec![at]), text, source);
        listing.target = Some(targets.len());
        listings.push(listing);
        targets.push(target);
    }

    fn titles(items: &[ContentItem], idx: &[usize]) -> Vec<String> {
        idx.iter().map(|i| items[*i].title.clone()).collect()
    }

    #[test]
    fn relations_follow_levels() {
        let chapters = vec![chapter("Work", 10, Some(3)), chapter("Home", 40, Some(9))];
        let mut listings = Vec::new();
        let mut targets = Vec::new();
        linked(&mut listings, &mut targets, "Finding a Job 4", 1, 12, EntrySource::Toc);
        linked(&mut listings, &mut targets, "Interviews", 2, 15, EntrySource::Toc);
        linked(&mut listings, &mut targets, "Keeping a Job", 1, 20, EntrySource::Toc);
        linked(&mut listings, &mut targets, "Renting", 1, 42, EntrySource::Toc);

        let items = build_items(&chapters, &listings, &targets);
        let order: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            order,
            vec!["Work", "Finding a Job", "Interviews", "Keeping a Job", "Home", "Renting"]
        );
        assert_eq!(items[1].page_number, Some(4));

        assert_eq!(items[2].parent, Some(1));
        assert_eq!(items[3].parent, Some(0));
        assert_eq!(items[3].prev, Some(1));
        assert_eq!(items[4].prev, Some(0));
        assert_eq!(items[4].parent, None);
        assert_eq!(items[2].next, Some(3));
        assert_eq!(items[5].next, None);
        assert_eq!(titles(&items, &items[0].children), vec!["Finding a Job", "Keeping a Job"]);
        assert_eq!(titles(&items, &items[4].children), vec!["Renting"]);
    }

    #[test]
    fn kinds_follow_source_and_title() {
        let chapters = vec![chapter("APPENDIX: Resources", 1, None)];
        let mut listings = Vec::new();
        let mut targets = Vec::new();
        linked(&mut listings, &mut targets, "Hotlines", 4, 3, EntrySource::Appendix);
        linked(&mut listings, &mut targets, "Budgeting", 2, 5, EntrySource::Toc);

        let items = build_items(&chapters, &listings, &targets);
        let kinds: Vec<_> = items.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![ItemKind::ChapterAppendix, ItemKind::SingleAppendix, ItemKind::Subsection]
        );
    }

    #[test]
    fn unlinked_listings_are_skipped() {
        let node = Document::parse("").root();
        let listings = vec![TocListing::new(node, Address::new(vec![0]), 1, "Lonely", EntrySource::Toc)];
        let items = build_items(&[], &listings, &[]);
        assert!(items.is_empty());
    }

    #[test]
    fn page_index_groups_by_page() {
        let chapters = vec![
            chapter("One", 1, Some(2)),
            chapter("Two", 10, None),
            chapter("Three", 20, Some(2)),
        ];
        let items = build_items(&chapters, &[], &[]);
        let pages = PageIndex::build(&items);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages.get(2), &[0, 2]);
        assert!(pages.get(7).is_empty());
    }
}
