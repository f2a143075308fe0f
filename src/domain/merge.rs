//! Tree reconciliation: import missing branches, keep the larger score.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::node::NodeId;
use crate::domain::tree::TaxonomyTree;

/// How leaf (L3) pairs are reconciled below a matched L2 pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Every persisting L3 × every incoming L3 takes the max, related or not.
    #[default]
    CrossProduct,
    /// Only same-named L3 pairs take the max.
    NameMatched,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::CrossProduct => f.write_str("cross-product"),
            MergePolicy::NameMatched => f.write_str("name-matched"),
        }
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cross-product" | "cross_product" => Ok(MergePolicy::CrossProduct),
            "name-matched" | "name_matched" => Ok(MergePolicy::NameMatched),
            other => Err(format!("unknown merge policy: {}", other)),
        }
    }
}

impl TaxonomyTree {
    /// Merge `incoming` into this tree.
    ///
    /// Incoming L1 branches whose id is unknown among the L1 nodes, or was
    /// generated by the incoming tree, are grafted in; every same-named pair
    /// of a previously present L1 and an incoming L1 is then reconciled
    /// branch-wide.
    /// Parent and sibling views are rebuilt afterwards.
    #[instrument(level = "debug", skip(self, incoming))]
    pub fn merge_from(&mut self, incoming: &TaxonomyTree, policy: MergePolicy) {
        let incoming_l1 = incoming.load_level_one_nodes();
        let existing = self.load_level_one_nodes();

        let mut present: HashSet<String> = existing
            .iter()
            .filter_map(|&n| self.item(n).map(|i| i.id.clone()))
            .collect();
        for &cmp in &incoming_l1 {
            let Some(item) = incoming.item(cmp) else {
                continue;
            };
            if incoming.is_minted(&item.id) || present.insert(item.id.clone()) {
                if let Some(record) = incoming.subtree_record(cmp) {
                    debug!("importing branch '{}' ({})", item.name, item.id);
                    self.attach(self.root(), record);
                }
            }
        }

        // grafted branches are copies already
        for pers in existing {
            for &cmp in &incoming_l1 {
                if self.same_name(pers, incoming, cmp) {
                    self.reconcile_branch(pers, incoming, cmp, policy);
                }
            }
        }

        self.rebuild_relations();
    }

    /// Reconcile a matched L1 pair and, below it, every L2 pair.
    ///
    /// No-op if the names differ.
    pub fn reconcile_branch(
        &mut self,
        pers: NodeId,
        incoming: &TaxonomyTree,
        cmp: NodeId,
        policy: MergePolicy,
    ) {
        if !self.same_name(pers, incoming, cmp) {
            return;
        }
        let imported = self.import_missing_children(pers, incoming, cmp);
        self.reconcile_values(pers, incoming, cmp);

        let pers_children: Vec<NodeId> = self
            .children_of(pers)
            .iter()
            .copied()
            .filter(|c| !imported.contains(c))
            .collect();
        for pers_child in pers_children {
            for &cmp_child in incoming.children_of(cmp) {
                self.reconcile_level_two(pers_child, incoming, cmp_child, policy);
            }
        }
    }

    fn reconcile_level_two(
        &mut self,
        pers: NodeId,
        incoming: &TaxonomyTree,
        cmp: NodeId,
        policy: MergePolicy,
    ) {
        if !self.same_name(pers, incoming, cmp) {
            return;
        }
        self.import_missing_children(pers, incoming, cmp);
        self.reconcile_values(pers, incoming, cmp);

        let pers_children = self.children_of(pers).to_vec();
        for pers_child in pers_children {
            for &cmp_child in incoming.children_of(cmp) {
                match policy {
                    MergePolicy::CrossProduct => {
                        self.reconcile_values(pers_child, incoming, cmp_child)
                    }
                    MergePolicy::NameMatched => {
                        if self.same_name(pers_child, incoming, cmp_child) {
                            self.reconcile_values(pers_child, incoming, cmp_child)
                        }
                    }
                }
            }
        }
    }

    /// Graft every incoming child whose id is not among `pers`'s children.
    /// Ids the incoming tree generated itself never count as a match.
    ///
    /// Returns the grafted handles; their ids may have been regenerated.
    fn import_missing_children(
        &mut self,
        pers: NodeId,
        incoming: &TaxonomyTree,
        cmp: NodeId,
    ) -> Vec<NodeId> {
        let mut imported = Vec::new();
        let mut present: HashSet<String> = self
            .children_of(pers)
            .iter()
            .filter_map(|&c| self.item(c).map(|i| i.id.clone()))
            .collect();
        for &cmp_child in incoming.children_of(cmp) {
            let Some(item) = incoming.item(cmp_child) else {
                continue;
            };
            if !incoming.is_minted(&item.id) && !present.insert(item.id.clone()) {
                continue;
            }
            if let Some(record) = incoming.subtree_record(cmp_child) {
                trace!("importing child '{}' ({})", item.name, item.id);
                imported.push(self.attach(pers, record));
            }
        }
        imported
    }

    fn reconcile_values(&mut self, pers: NodeId, incoming: &TaxonomyTree, cmp: NodeId) {
        let Some(cmp_item) = incoming.item(cmp) else {
            return;
        };
        if let Some(item) = self.item_mut(pers) {
            item.estimations.reconcile_max(&cmp_item.estimations);
        }
    }

    fn same_name(&self, pers: NodeId, incoming: &TaxonomyTree, cmp: NodeId) -> bool {
        match (self.item(pers), incoming.item(cmp)) {
            (Some(a), Some(b)) => a.name == b.name,
            _ => false,
        }
    }
}
