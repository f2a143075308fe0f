//! Diagnostic renderings of a taxonomy. Not a serialization format.

use std::fmt;

use termtree::Tree;

use crate::domain::course::Level;
use crate::domain::node::NodeId;
use crate::domain::tree::TaxonomyTree;

const L2_MARKER: &str = "  └── ";
const L3_MARKER: &str = "        └── ";

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for TaxonomyTree {
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(tree: &TaxonomyTree, id: NodeId, parent_tree: &mut Tree<String>) {
            for &child in tree.children_of(id) {
                if let Some(node) = tree.node(child) {
                    let mut child_tree = Tree::new(format!("{} [{}]", node.item, node.item.id));
                    build_tree(tree, child, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let mut root = Tree::new(self.root_node().item.name.clone());
        build_tree(self, self.root(), &mut root);
        root
    }
}

impl TaxonomyTree {
    /// `[Branch <name>]` plus two indented levels below an L1 node.
    ///
    /// Returns None for unknown handles and for nodes that are not L1.
    pub fn branch_string(&self, l1: NodeId) -> Option<String> {
        let node = self.node(l1)?;
        if node.item.level != Level::L1 {
            return None;
        }
        let mut out = format!("[Branch {}]\n", node.item.name);
        self.push_lower_ranks(l1, &mut out);
        Some(out)
    }

    fn push_lower_ranks(&self, l1: NodeId, out: &mut String) {
        for &l2 in self.children_of(l1) {
            let Some(child) = self.node(l2) else { continue };
            out.push_str(L2_MARKER);
            out.push_str(&child.to_string());
            out.push('\n');
            for &l3 in self.children_of(l2) {
                if let Some(grandchild) = self.node(l3) {
                    out.push_str(L3_MARKER);
                    out.push_str(&grandchild.to_string());
                    out.push('\n');
                }
            }
        }
    }
}

impl fmt::Display for TaxonomyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.root_has_children() {
            return Ok(());
        }
        writeln!(f, "[Root: {}]", self.root_node().item.name)?;
        for &l1 in self.children_of(self.root()) {
            let Some(branch) = self.node(l1) else { continue };
            let mut lower = String::new();
            self.push_lower_ranks(l1, &mut lower);
            write!(f, "[Branch]\n{}\n{}", branch, lower)?;
        }
        Ok(())
    }
}
