//! Arena-backed taxonomy tree: identity, lookup, mutation, reconstruction.

use std::collections::HashSet;

use generational_arena::Arena;
use itertools::Itertools;
use tracing::{debug, instrument, trace, warn};

use crate::domain::course::Level;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ids::IdGenerator;
use crate::domain::item::TaxonomyItem;
use crate::domain::node::{NodeId, TaxonomyNode, ROOT_NAME};
use crate::domain::record::{NodeRecord, TreeRecord};

pub const ROOT_ID: &str = "000000";
pub const ROOT_DESCRIPTION: &str = "The root node";

/// Fixed L1 categories of the canonical tree, with their ids.
pub const DEFAULT_BRANCHES: [(&str, &str); 8] = [
    ("000001", "Programmieren"),
    ("000002", "Design"),
    ("000003", "Technische Grundlagen"),
    ("000004", "Sicherheit"),
    ("000005", "Kommunikation und Medien"),
    ("000006", "Hardware"),
    ("000007", "Naturwissenschaften"),
    ("000008", "Social Skills"),
];

/// Aggregate root of the taxonomy.
///
/// Owns every node through a generational arena, the single root handle,
/// the registry of item ids and the generator used to heal id collisions.
/// Ids the tree had to generate itself are tracked separately: they carry no
/// identity across trees.
/// Parent and sibling views are rebuilt by [`TaxonomyTree::rebuild_relations`]
/// after every load and merge.
#[derive(Debug, Clone)]
pub struct TaxonomyTree {
    arena: Arena<TaxonomyNode>,
    root: NodeId,
    ids: HashSet<String>,
    minted: HashSet<String>,
    id_generator: IdGenerator,
}

impl Default for TaxonomyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxonomyTree {
    /// Canonical tree: a literal root and the eight default L1 categories.
    pub fn new() -> Self {
        Self::with_generator(IdGenerator::new())
    }

    pub fn with_generator(id_generator: IdGenerator) -> Self {
        let root_item = TaxonomyItem {
            estimations: Default::default(),
            ..TaxonomyItem::with_id(ROOT_ID, ROOT_NAME, Level::Root)
        }
        .described(ROOT_DESCRIPTION);
        let branches = DEFAULT_BRANCHES
            .iter()
            .map(|(id, name)| NodeRecord::new(TaxonomyItem::with_id(*id, *name, Level::L1)));
        let record = TreeRecord {
            root: NodeRecord::new(root_item).with_children(branches),
        };
        Self::from_record_with(record, id_generator)
    }

    /// Rebuild a tree from its wire form.
    ///
    /// Parents, sibling views and the id registry are restored before the
    /// tree is returned; missing or duplicate ids are regenerated.
    pub fn from_record(record: TreeRecord) -> Self {
        Self::from_record_with(record, IdGenerator::new())
    }

    #[instrument(level = "debug", skip(record, id_generator))]
    pub fn from_record_with(record: TreeRecord, id_generator: IdGenerator) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TaxonomyNode::new(record.root.item));
        let mut tree = Self {
            arena,
            root,
            ids: HashSet::new(),
            minted: HashSet::new(),
            id_generator,
        };
        tree.register_id(root);
        for child in record.root.children {
            tree.attach(root, child);
        }
        tree.rebuild_relations();
        debug!("reconstructed tree with {} nodes", tree.len());
        tree
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        Self::from_json_with(json, IdGenerator::new())
    }

    pub fn from_json_with(json: &str, id_generator: IdGenerator) -> DomainResult<Self> {
        let record: TreeRecord = serde_json::from_str(json)?;
        Ok(Self::from_record_with(record, id_generator))
    }

    pub fn to_record(&self) -> TreeRecord {
        TreeRecord {
            root: self.build_record(self.root_node()),
        }
    }

    pub fn to_json(&self) -> DomainResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    /// Detached copy of the subtree below `id`.
    pub fn subtree_record(&self, id: NodeId) -> Option<NodeRecord> {
        self.arena.get(id).map(|node| self.build_record(node))
    }

    pub fn node_to_json(&self, id: NodeId) -> DomainResult<String> {
        let record = self
            .subtree_record(id)
            .ok_or_else(|| DomainError::UnknownNode(format!("{:?}", id)))?;
        Ok(serde_json::to_string(&record)?)
    }

    fn build_record(&self, node: &TaxonomyNode) -> NodeRecord {
        NodeRecord {
            item: node.item.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&c| self.arena.get(c))
                .map(|child| self.build_record(child))
                .collect(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &TaxonomyNode {
        &self.arena[self.root]
    }

    pub fn node(&self, id: NodeId) -> Option<&TaxonomyNode> {
        self.arena.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TaxonomyNode> {
        self.arena.get_mut(id)
    }

    pub fn item(&self, id: NodeId) -> Option<&TaxonomyItem> {
        self.arena.get(id).map(|n| &n.item)
    }

    pub fn item_mut(&mut self, id: NodeId) -> Option<&mut TaxonomyItem> {
        self.arena.get_mut(id).map(|n| &mut n.item)
    }

    /// Children of `id`; empty for unknown handles.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn root_has_children(&self) -> bool {
        self.root_node().has_children()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Registered item ids.
    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// True if `id` was generated by this tree rather than supplied.
    pub fn is_minted(&self, id: &str) -> bool {
        self.minted.contains(id)
    }

    /// Pre-order walk from the root.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Number of ranks including the root.
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        1 + self
            .children_of(id)
            .iter()
            .map(|&c| self.calculate_depth(c))
            .max()
            .unwrap_or(0)
    }

    fn name_of(&self, id: NodeId) -> &str {
        self.item(id).map(|i| i.name.as_str()).unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// First node matching `pred`, with its parent.
    ///
    /// Scan order is depth-first: each L1 in order, directly followed by its
    /// L2 children, each L2 directly followed by its L3 children.
    fn find_with<F>(&self, pred: F) -> Option<(NodeId, NodeId)>
    where
        F: Fn(&TaxonomyItem) -> bool,
    {
        let matches = |id: NodeId| self.item(id).map(&pred).unwrap_or(false);
        for &l1 in self.children_of(self.root) {
            if matches(l1) {
                return Some((self.root, l1));
            }
            for &l2 in self.children_of(l1) {
                if matches(l2) {
                    return Some((l1, l2));
                }
                if let Some(&l3) = self.children_of(l2).iter().find(|&&l3| matches(l3)) {
                    return Some((l2, l3));
                }
            }
        }
        None
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_with(|item| item.id == id).map(|(_, node)| node)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.find_with(|item| item.name == name).map(|(_, node)| node)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&TaxonomyNode> {
        self.find_by_id(id).and_then(|n| self.node(n))
    }

    pub fn get_by_name(&self, name: &str) -> Option<&TaxonomyNode> {
        self.find_by_name(name).and_then(|n| self.node(n))
    }

    pub fn get_by_id_mut(&mut self, id: &str) -> Option<&mut TaxonomyNode> {
        let node = self.find_by_id(id)?;
        self.node_mut(node)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut TaxonomyNode> {
        let node = self.find_by_name(name)?;
        self.node_mut(node)
    }

    /// Every L3 node under the L1 node(s) called `name`, first-seen order.
    pub fn get_level_three_by_level_one_name(&self, name: &str) -> Vec<NodeId> {
        self.children_of(self.root)
            .iter()
            .filter(|&&l1| self.name_of(l1) == name)
            .flat_map(|&l1| self.children_of(l1).iter())
            .flat_map(|&l2| self.children_of(l2).iter().copied())
            .unique()
            .collect()
    }

    pub fn load_level_one_nodes(&self) -> Vec<NodeId> {
        self.children_of(self.root).to_vec()
    }

    pub fn load_level_two_nodes(&self) -> Vec<NodeId> {
        self.children_of(self.root)
            .iter()
            .flat_map(|&l1| self.children_of(l1).iter().copied())
            .collect()
    }

    pub fn load_level_three_nodes(&self) -> Vec<NodeId> {
        self.load_level_two_nodes()
            .into_iter()
            .flat_map(|l2| self.children_of(l2).iter().copied())
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Attach a new L1 branch under the root.
    ///
    /// The new node's sibling view is the L1 set as it was before the
    /// insertion. Returns None if the branch would reach below L3.
    #[instrument(level = "debug", skip(self, record), fields(name = %record.item.name))]
    pub fn add_level_one(&mut self, record: NodeRecord) -> Option<NodeId> {
        if record.depth() > Level::Root.remaining_depth() {
            warn!("rejecting L1 branch '{}': too deep", record.item.name);
            return None;
        }
        let previous = self.children_of(self.root).to_vec();
        let node = self.attach_ranked(self.root, Level::L1, record);
        if let Some(n) = self.node_mut(node) {
            n.add_siblings(previous);
        }
        Some(node)
    }

    /// Attach `record` below the L1 or L2 node with item id `id`.
    pub fn add_to_parent_by_id(&mut self, id: &str, record: NodeRecord) -> bool {
        self.add_to_parent_with(|item| item.id == id, record)
    }

    /// Attach `record` below the L1 or L2 node called `name`.
    pub fn add_to_parent_by_name(&mut self, name: &str, record: NodeRecord) -> bool {
        self.add_to_parent_with(|item| item.name == name, record)
    }

    #[instrument(level = "debug", skip_all, fields(name = %record.item.name))]
    fn add_to_parent_with<F>(&mut self, pred: F, record: NodeRecord) -> bool
    where
        F: Fn(&TaxonomyItem) -> bool,
    {
        let Some((parent, rank)) = self.find_parent_slot(pred) else {
            debug!("no L1/L2 parent matched");
            return false;
        };
        if record.depth() > rank.remaining_depth() {
            warn!("rejecting '{}': would reach below L3", record.item.name);
            return false;
        }
        let Some(child_rank) = rank.child() else {
            return false;
        };
        self.attach_ranked(parent, child_rank, record);
        self.update_siblings();
        true
    }

    /// Parent candidates stop at L2: scan each L1, then its L2 children.
    fn find_parent_slot<F>(&self, pred: F) -> Option<(NodeId, Level)>
    where
        F: Fn(&TaxonomyItem) -> bool,
    {
        let matches = |id: NodeId| self.item(id).map(&pred).unwrap_or(false);
        for &l1 in self.children_of(self.root) {
            if matches(l1) {
                return Some((l1, Level::L1));
            }
            if let Some(&l2) = self.children_of(l1).iter().find(|&&l2| matches(l2)) {
                return Some((l2, Level::L2));
            }
        }
        None
    }

    /// Remove the first node with item id `id`; sibling views are left as is.
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        let found = self.find_with(|item| item.id == id);
        self.delete_found(found)
    }

    /// Remove the first node called `name`; sibling views are left as is.
    pub fn delete_by_name(&mut self, name: &str) -> bool {
        let found = self.find_with(|item| item.name == name);
        self.delete_found(found)
    }

    fn delete_found(&mut self, found: Option<(NodeId, NodeId)>) -> bool {
        let Some((parent, node)) = found else {
            return false;
        };
        let detached = self
            .node_mut(parent)
            .map(|p| p.delete_child(node))
            .unwrap_or(false);
        if detached {
            self.remove_subtree(node);
        }
        detached
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                trace!("removed node '{}' ({})", node.item.name, node.item.id);
                self.ids.remove(&node.item.id);
                self.minted.remove(&node.item.id);
                stack.extend(node.children);
            }
        }
    }

    /// Insert a detached subtree below `parent`, registering every id.
    ///
    /// Children keep the order of the record.
    pub(crate) fn attach(&mut self, parent: NodeId, record: NodeRecord) -> NodeId {
        self.attach_inner(parent, None, record)
    }

    /// Like [`attach`](Self::attach) but relabels levels by position.
    fn attach_ranked(&mut self, parent: NodeId, rank: Level, record: NodeRecord) -> NodeId {
        self.attach_inner(parent, Some(rank), record)
    }

    fn attach_inner(&mut self, parent: NodeId, rank: Option<Level>, record: NodeRecord) -> NodeId {
        let mut top = None;
        let mut stack = vec![(record, parent, rank)];

        while let Some((current, parent_idx, rank)) = stack.pop() {
            let NodeRecord { mut item, children } = current;
            if let Some(level) = rank {
                if item.level != level {
                    debug!("relabel '{}' {} -> {}", item.name, item.level, level);
                    item.level = level;
                }
            }
            let mut node = TaxonomyNode::new(item);
            node.add_parent(parent_idx);
            let idx = self.arena.insert(node);
            if let Some(p) = self.arena.get_mut(parent_idx) {
                p.add_child(idx);
            }
            self.register_id(idx);
            top.get_or_insert(idx);

            let child_rank = rank.and_then(|r| r.child());
            for child in children.into_iter().rev() {
                stack.push((child, idx, child_rank));
            }
        }

        // the stack always yields the record itself first
        top.unwrap_or(parent)
    }

    /// Put the item id of `id` into the registry, regenerating it while it
    /// is empty or already taken.
    fn register_id(&mut self, id: NodeId) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        let supplied = node.item.has_id();
        let current = &mut node.item.id;
        if !supplied || self.ids.contains(current.as_str()) {
            let fresh = self.id_generator.generate_unique(&self.ids);
            if supplied {
                debug!("id collision on '{}', regenerated as '{}'", current, fresh);
            }
            *current = fresh;
            self.minted.insert(current.clone());
        }
        self.ids.insert(current.clone());
    }

    // ------------------------------------------------------------------
    // Derived relations
    // ------------------------------------------------------------------

    /// Rebuild parent handles and sibling views for the whole tree.
    pub fn rebuild_relations(&mut self) {
        self.update_parents();
        self.update_siblings();
    }

    pub fn update_parents(&mut self) {
        let root = self.root;
        if let Some(r) = self.arena.get_mut(root) {
            r.parent = None;
        }
        for (parent, children) in self.child_lists() {
            for child in children {
                if let Some(node) = self.arena.get_mut(child) {
                    node.add_parent(parent);
                }
            }
        }
    }

    /// Every node's sibling view becomes the other children of its parent.
    pub fn update_siblings(&mut self) {
        for (_, children) in self.child_lists() {
            for &child in &children {
                let others = children.iter().copied().filter(|&c| c != child).collect();
                if let Some(node) = self.arena.get_mut(child) {
                    node.siblings = Some(others);
                }
            }
        }
    }

    fn child_lists(&self) -> Vec<(NodeId, Vec<NodeId>)> {
        self.iter()
            .filter(|(_, node)| node.has_children())
            .map(|(id, node)| (id, node.children.clone()))
            .collect()
    }
}

/// Pre-order iterator over `(handle, node)` pairs.
pub struct TreeIterator<'a> {
    tree: &'a TaxonomyTree,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a TaxonomyTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TaxonomyNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(current) {
                // reverse so the first child is visited first
                self.stack.extend(node.children.iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}
