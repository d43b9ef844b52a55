// ABOUTME: Footnote definition extraction into a number-keyed index.
// ABOUTME: Definitions are relabelled, detached from the tree and kept as owned markup.

use std::collections::BTreeMap;

use ego_tree::NodeId;

use crate::dom::serialize::{escape_attr, escape_text, write_close_tag, write_open_tag};
use crate::dom::Document;

/// Footnote definitions keyed by footnote number.
#[derive(Debug, Clone, Default)]
pub struct FootnoteIndex {
    notes: BTreeMap<String, String>,
}

impl FootnoteIndex {
    /// Markup of the `<li>` for footnote `number`.
    pub fn get(&self, number: &str) -> Option<&str> {
        self.notes.get(number).map(String::as_str)
    }

    pub fn insert(&mut self, number: impl Into<String>, html: impl Into<String>) {
        self.notes.insert(number.into(), html.into());
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Definition ids contain `footnote`; citation ids contain `footnote-ref`.
pub fn is_footnote_id(id: &str) -> bool {
    id.contains("footnote") && !id.contains("footnote-ref")
}

pub fn is_footnote_ref_id(id: &str) -> bool {
    id.contains("footnote-ref")
}

/// The number after the last `-` of a footnote or footnote-ref id.
pub fn footnote_number(id: &str) -> &str {
    id.rsplit('-').next().unwrap_or(id)
}

fn render_definition(doc: &Document, id: NodeId, number: &str) -> String {
    let mut out = String::new();
    match doc.element(id) {
        Some(el) => write_open_tag(el, &["id"], &mut out),
        None => out.push_str("<li>"),
    }
    out.push_str(&format!(
        r#"<sup id="footnote-{}">{}</sup>"#,
        escape_attr(number),
        escape_text(number)
    ));
    out.push_str(&doc.inner_html(id));
    write_close_tag("li", &mut out);
    out
}

/// Pull every footnote definition `<li>` out of the document.
///
/// Each definition loses its id, gains a `<sup>` number label as first child,
/// and is detached so it no longer occupies a position in the tree.
pub fn extract_footnotes(doc: &mut Document) -> FootnoteIndex {
    let mut index = FootnoteIndex::default();
    let definitions =
        doc.find_all(|el| el.name() == "li" && el.attr("id").is_some_and(is_footnote_id));
    for id in definitions {
        let Some(raw_id) = doc.attr(id, "id").map(str::to_string) else {
            continue;
        };
        let number = footnote_number(&raw_id).to_string();
        let html = render_definition(doc, id, &number);
        doc.detach(id);
        index.insert(number, html);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_are_classified() {
        assert!(is_footnote_id("footnote-3"));
        assert!(!is_footnote_id("footnote-ref-3"));
        assert!(is_footnote_ref_id("footnote-ref-3"));
        assert_eq!(footnote_number("footnote-ref-12"), "12");
    }

    #[test]
    fn definitions_are_relabelled_and_detached() {
        let mut doc = Document::parse(concat!(
            r##"<p>Body<sup><a href="#footnote-3" id="footnote-ref-3">[3]</a></sup></p>"##,
            r#"<ol><li id="footnote-3" class="note"><p>See the code.</p></li></ol>"#,
        ));
        let index = extract_footnotes(&mut doc);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get("3"),
            Some(r#"<li class="note"><sup id="footnote-3">3</sup><p>See the code.</p></li>"#)
        );
        assert!(doc.find_by_tag("li").is_empty());
        // the citation is untouched
        assert_eq!(doc.find_by_attr("id", is_footnote_ref_id).len(), 1);
    }

    #[test]
    fn non_list_items_are_ignored() {
        let mut doc = Document::parse(r#"<div id="footnote-1">x</div>"#);
        assert!(extract_footnotes(&mut doc).is_empty());
        assert_eq!(doc.find_by_tag("div").len(), 1);
    }
}
