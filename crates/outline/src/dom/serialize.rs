// ABOUTME: Hand-written HTML serializer for scraper nodes.
// ABOUTME: Escapes text and attributes, self-closes void elements, and supports attribute skipping.

use ego_tree::NodeRef;
use scraper::node::Element;
use scraper::Node;

/// Serialize a node and its subtree.
pub fn write_node(node: NodeRef<Node>, out: &mut String) {
    write_node_mapped(node, out, &mut |_, escaped| escaped);
}

/// Serialize a node, passing every escaped text run through `map_text`.
///
/// Raw text inside `script` and `style` is written as is.
pub fn write_node_mapped<F>(node: NodeRef<Node>, out: &mut String, map_text: &mut F)
where
    F: FnMut(NodeRef<Node>, String) -> String,
{
    match node.value() {
        Node::Text(t) => {
            let raw = node
                .parent()
                .and_then(|p| p.value().as_element().map(|el| is_raw_text_element(el.name())))
                .unwrap_or(false);
            if raw {
                out.push_str(&**t);
            } else {
                out.push_str(&map_text(node, escape_text(&**t)));
            }
        }
        Node::Element(el) => {
            write_open_tag(el, &[], out);
            if is_void_element(el.name()) {
                return;
            }
            for child in node.children() {
                write_node_mapped(child, out, map_text);
            }
            write_close_tag(el.name(), out);
        }
        Node::Comment(c) => {
            out.push_str("<!--");
            out.push_str(&**c);
            out.push_str("-->");
        }
        Node::Document | Node::Fragment => {
            for child in node.children() {
                write_node_mapped(child, out, map_text);
            }
        }
        _ => {}
    }
}

/// Write `<name attr="...">`, leaving out any attribute named in `skip_attrs`.
pub fn write_open_tag(el: &Element, skip_attrs: &[&str], out: &mut String) {
    let name = el.name();
    out.push('<');
    out.push_str(name);
    for (k, v) in el.attrs() {
        if skip_attrs.iter().any(|s| s.eq_ignore_ascii_case(k)) {
            continue;
        }
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        out.push_str(&escape_attr(v));
        out.push('"');
    }
    if is_void_element(name) {
        out.push_str(" />");
    } else {
        out.push('>');
    }
}

pub fn write_close_tag(name: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Escape attribute value
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape character data
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Check if tag is void element
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}
