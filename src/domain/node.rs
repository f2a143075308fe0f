//! Arena node: an item plus owned child handles and derived relations.

use std::fmt;

use generational_arena::Index;

use crate::domain::item::TaxonomyItem;

/// Handle of a node inside its tree's arena.
pub type NodeId = Index;

/// Literal name that marks the logical root.
pub const ROOT_NAME: &str = "root";

/// Tree node in the arena-based taxonomy.
///
/// `children` is owned structure. `parent` and `siblings` are derived views:
/// never persisted, rebuilt by the tree after load and merge, and allowed to
/// go stale after deletions.
#[derive(Debug, Clone)]
pub struct TaxonomyNode {
    pub item: TaxonomyItem,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// None until computed
    pub siblings: Option<Vec<NodeId>>,
}

impl TaxonomyNode {
    pub fn new(item: TaxonomyItem) -> Self {
        Self {
            item,
            children: Vec::new(),
            parent: None,
            siblings: None,
        }
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.item.name == ROOT_NAME
    }

    /// Appends without a duplicate check; the same handle may be added twice.
    pub fn add_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub fn add_parent(&mut self, parent: NodeId) {
        self.parent = Some(parent);
    }

    pub fn add_sibling(&mut self, sibling: NodeId) {
        self.siblings.get_or_insert_with(Vec::new).push(sibling);
    }

    pub fn add_siblings(&mut self, siblings: Vec<NodeId>) {
        match self.siblings.as_mut() {
            Some(existing) => existing.extend(siblings),
            None => self.siblings = Some(siblings),
        }
    }

    /// Removes the first occurrence of `child`. Returns false if absent.
    pub fn delete_child(&mut self, child: NodeId) -> bool {
        match self.children.iter().position(|&c| c == child) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn siblings(&self) -> &[NodeId] {
        self.siblings.as_deref().unwrap_or(&[])
    }
}

impl fmt::Display for TaxonomyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.item)
    }
}
