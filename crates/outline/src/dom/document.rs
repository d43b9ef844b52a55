// ABOUTME: Ordered-tree view over a parsed HTML fragment with lookup and limited mutation.
// ABOUTME: Node lookup by tag, class and attribute predicate, always in document order.

use ego_tree::{NodeId, NodeRef};
use scraper::node::{Element, Text};
use scraper::{Html, Node};

use super::serialize::{write_node, write_node_mapped};

/// A parsed export document.
///
/// Lookups never fail loudly: unknown or detached ids yield `None`, empty
/// strings or empty lists, matching the best-effort nature of reconstruction.
pub struct Document {
    html: Html,
    root: NodeId,
}

impl Document {
    /// Parse an HTML fragment. The fragment's `<html>` element becomes the root.
    pub fn parse(html: &str) -> Self {
        let html = Html::parse_fragment(html);
        let root = html.root_element().id();
        Self { html, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id)?.value().as_element()
    }

    /// Lowercase tag name for element nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name())
    }

    pub fn is_tag(&self, id: NodeId, name: &str) -> bool {
        self.tag(id).is_some_and(|tag| tag.eq_ignore_ascii_case(name))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Class names in attribute order.
    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn first_class(&self, id: NodeId) -> Option<&str> {
        self.attr(id, "class")?.split_whitespace().next()
    }

    /// Concatenated text of the node and all of its descendants.
    pub fn text(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        node.descendants()
            .filter_map(|n| n.value().as_text())
            .map(|t| &**t)
            .collect()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    /// Children of the document root, in order.
    pub fn top_level(&self) -> Vec<NodeId> {
        self.children(self.root)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent().map(|p| p.id())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.next_sibling().map(|s| s.id())
    }

    /// The node itself followed by all descendants in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| n.descendants().map(|d| d.id()).collect())
            .unwrap_or_default()
    }

    /// Every element below the root matching `pred`, in document order.
    pub fn find_all(&self, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        let Some(root) = self.node(self.root) else {
            return Vec::new();
        };
        root.descendants()
            .skip(1)
            .filter(|n| n.value().as_element().is_some_and(&pred))
            .map(|n| n.id())
            .collect()
    }

    pub fn find_by_tag(&self, name: &str) -> Vec<NodeId> {
        self.find_all(|el| el.name().eq_ignore_ascii_case(name))
    }

    /// Elements with at least one class accepted by `pred`.
    pub fn find_by_class(&self, pred: impl Fn(&str) -> bool) -> Vec<NodeId> {
        self.find_all(|el| {
            el.attr("class")
                .is_some_and(|c| c.split_whitespace().any(&pred))
        })
    }

    /// Elements carrying attribute `name` whose value is accepted by `pred`.
    pub fn find_by_attr(&self, name: &str, pred: impl Fn(&str) -> bool) -> Vec<NodeId> {
        self.find_all(|el| el.attr(name).is_some_and(&pred))
    }

    /// Remove a node (and its subtree) from the tree.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        for child in self.children(id) {
            self.detach(child);
        }
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.append(Node::Text(Text { text: text.into() }));
        }
    }

    /// Move `child` (from wherever it is) to be the first child of `parent`.
    pub fn move_to_front(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        if let Some(mut node) = self.html.tree.get_mut(parent) {
            node.prepend_id(child);
        }
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.node(id) {
            write_node(node, &mut out);
        }
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        self.inner_html_mapped(id, |_, escaped| escaped)
    }

    /// Inner markup with every escaped text run under `id` passed through `map_text`.
    pub fn inner_html_mapped<F>(&self, id: NodeId, mut map_text: F) -> String
    where
        F: FnMut(NodeRef<'_, Node>, String) -> String,
    {
        let mut out = String::new();
        if let Some(node) = self.node(id) {
            for child in node.children() {
                write_node_mapped(child, &mut out, &mut map_text);
            }
        }
        out
    }
}
