// ABOUTME: Assigns each content item the run of top-level nodes between it and the next item.
// ABOUTME: Ranges are half-open root-index intervals; the last item runs to the end of the document.

use crate::dom::Document;
use crate::hierarchy::ContentItem;

/// Set `range` and `nodes` on every item.
///
/// Items must be in address order. Nodes before the first item (front
/// matter and the table of contents itself) belong to no item.
pub fn slice_content(doc: &Document, items: &mut [ContentItem]) {
    let top = doc.top_level();
    let starts: Vec<usize> = items.iter().map(|item| item.address.root_index()).collect();
    for (i, item) in items.iter_mut().enumerate() {
        let start = starts[i].min(top.len());
        let end = starts
            .get(i + 1)
            .copied()
            .unwrap_or(top.len())
            .clamp(start, top.len());
        item.range = start..end;
        item.nodes = top[start..end].to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{AddressBook, Document};
    use crate::extract::{parse_chapters, Chapter};
    use crate::hierarchy::build_items;
    use crate::options::Options;

    fn items_for(doc: &Document) -> Vec<ContentItem> {
        let book = AddressBook::build(doc);
        let opts = Options {
            chapter_merge_distance: 0,
            ..Options::default()
        };
        let chapters: Vec<Chapter> = parse_chapters(doc, &book, &opts);
        build_items(&chapters, &[], &[])
    }

    #[test]
    fn ranges_cover_document_without_gaps() {
        let doc = Document::parse(
            "<h1>One</h1><p>a</p><p>b</p><h1>Two</h1><p>c</p><h1>Three</h1><p>d</p><p>e</p>",
        );
        let mut items = items_for(&doc);
        slice_content(&doc, &mut items);

        let ranges: Vec<_> = items.iter().map(|i| i.range.clone()).collect();
        assert_eq!(ranges, vec![0..3, 3..5, 5..8]);

        let rebuilt: Vec<_> = items.iter().flat_map(|i| i.nodes.clone()).collect();
        assert_eq!(rebuilt, doc.top_level());
    }

    #[test]
    fn shared_root_index_yields_empty_range() {
        let doc = Document::parse("<h1>Alpha</h1><p>x</p>");
        let mut items = items_for(&doc);
        let mut nested = items[0].clone();
        nested.address = crate::dom::Address::new(vec![0, 0]);
        items.push(nested);
        slice_content(&doc, &mut items);
        assert_eq!(items[0].range, 0..0);
        assert_eq!(items[1].range, 0..2);
    }
}
