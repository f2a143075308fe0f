//! Wire form of a tree: `{ root }`, `{ item, children }`.
//!
//! Records are also the detached subtree type handed to insertion and to
//! merge helpers that work without a tree around them.

use serde::{Deserialize, Serialize};

use crate::domain::estimation::null_as_default;
use crate::domain::item::TaxonomyItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub item: TaxonomyItem,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    pub fn new(item: TaxonomyItem) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeRecord>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of ranks this subtree spans (a leaf spans one).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(|c| c.count()).sum::<usize>()
    }
}

impl From<TaxonomyItem> for NodeRecord {
    fn from(item: TaxonomyItem) -> Self {
        Self::new(item)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub root: NodeRecord,
}
