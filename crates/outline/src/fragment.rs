// ABOUTME: Owned content fragments produced when a content item detaches its slice of the document.
// ABOUTME: Each fragment keeps its serialized HTML plus the tag, first class and text used by annotation.

use ego_tree::NodeId;
use serde::{Deserialize, Serialize};

use crate::dom::Document;

/// One top-level piece of an item's content, owned independently of the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Element name; `None` for text nodes and multi-node fragments.
    pub tag: Option<String>,
    pub class: Option<String>,
    pub text: String,
    pub html: String,
}

impl Fragment {
    /// Snapshot a node of the document.
    pub fn from_node(doc: &Document, id: NodeId) -> Self {
        Self {
            tag: doc.tag(id).map(str::to_string),
            class: doc.first_class(id).map(str::to_string),
            text: doc.text(id),
            html: doc.outer_html(id),
        }
    }

    /// Build a fragment from raw markup.
    ///
    /// Markup holding exactly one top-level node keeps that node's tag and
    /// class; anything else becomes an anonymous fragment.
    pub fn parse(html: &str) -> Self {
        let doc = Document::parse(html);
        let top = doc.top_level();
        if let [only] = top.as_slice() {
            return Self::from_node(&doc, *only);
        }
        Self {
            tag: None,
            class: None,
            text: doc.text(doc.root()),
            html: doc.inner_html(doc.root()),
        }
    }

    /// h1 through h4.
    pub fn is_heading(&self) -> bool {
        matches!(self.tag.as_deref(), Some("h1" | "h2" | "h3" | "h4"))
    }
}

/// Join fragments back into a single markup string.
pub fn join_html(fragments: &[Fragment]) -> String {
    fragments.iter().map(|f| f.html.as_str()).collect()
}
