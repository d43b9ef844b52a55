// ABOUTME: Positional addresses: root-to-leaf sibling-index paths for every node in the export.
// ABOUTME: Addresses order nodes in document order and drive all range slicing.

use std::collections::HashMap;
use std::fmt;

use ego_tree::NodeId;

use super::Document;

/// The position of a node as the sibling index at each depth, root first.
///
/// Ordering is lexicographic over the segments, so an ancestor sorts before
/// its descendants and both sort before anything that follows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(Vec<usize>);

impl Address {
    pub fn new(segments: Vec<usize>) -> Self {
        Self(segments)
    }

    /// Index of the top-level node this address lives under.
    pub fn root_index(&self) -> usize {
        self.0.first().copied().unwrap_or(0)
    }

    /// True when `other` is this node or lies inside it.
    pub fn contains(&self, other: &Address) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Walk the ancestor chain of `id` up to the document root.
    ///
    /// Returns `None` for nodes that are no longer attached to the root.
    pub fn locate(doc: &Document, id: NodeId) -> Option<Address> {
        let root = doc.root();
        if id == root {
            return Some(Address::default());
        }
        let mut indexes = Vec::new();
        let mut current = id;
        loop {
            let parent = doc.parent(current)?;
            let index = doc.children(parent).iter().position(|c| *c == current)?;
            indexes.push(index);
            if parent == root {
                break;
            }
            current = parent;
        }
        indexes.reverse();
        Some(Address(indexes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{:06}", segment)?;
        }
        Ok(())
    }
}

/// Addresses for every attached node, computed once in a single pass.
///
/// The book is a snapshot: mutating the document afterwards does not update it.
#[derive(Debug, Default)]
pub struct AddressBook {
    map: HashMap<NodeId, Address>,
}

impl AddressBook {
    pub fn build(doc: &Document) -> Self {
        let mut map = HashMap::new();
        map.insert(doc.root(), Address::default());
        let mut stack = vec![(doc.root(), Vec::new())];
        while let Some((id, path)) = stack.pop() {
            for (i, child) in doc.children(id).into_iter().enumerate() {
                let mut child_path: Vec<usize> = path.clone();
                child_path.push(i);
                map.insert(child, Address(child_path.clone()));
                stack.push((child, child_path));
            }
        }
        Self { map }
    }

    pub fn get(&self, id: NodeId) -> Option<&Address> {
        self.map.get(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
