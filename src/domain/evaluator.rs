//! Stateless evaluation: aggregate a tree into a ranked result, merge trees.

use std::cmp::Ordering;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::course::DegreeCourse;
use crate::domain::estimation::{EstimationEntry, EstimationSet};
use crate::domain::merge::MergePolicy;
use crate::domain::node::NodeId;
use crate::domain::record::NodeRecord;
use crate::domain::tree::TaxonomyTree;

/// Number of courses a recommendation lists by default.
pub const DEFAULT_TOP_N: usize = 3;

/// Tree-wide aggregate score, one entry per scored course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationResult {
    result_set: EstimationSet,
}

impl Default for EvaluationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationResult {
    pub fn new() -> Self {
        Self {
            result_set: EstimationSet::seeded(),
        }
    }

    pub fn from_set(result_set: EstimationSet) -> Self {
        Self { result_set }
    }

    pub fn result_set(&self) -> &EstimationSet {
        &self.result_set
    }

    pub fn get_estimation_by_course(&self, course: DegreeCourse) -> Option<&EstimationEntry> {
        self.result_set.get(course)
    }

    pub fn value(&self, course: DegreeCourse) -> f64 {
        self.result_set.value(course).unwrap_or(0.0)
    }

    /// Sum `entry` into its course; courses outside the result are dropped.
    pub fn add_points_to_course(&mut self, entry: &EstimationEntry) {
        self.result_set.add_points(entry);
    }

    /// The three best courses.
    pub fn get_ordered_result(&self) -> Vec<EstimationEntry> {
        self.ordered_top(DEFAULT_TOP_N)
    }

    /// The `n` best courses, descending by value. Equal values keep the
    /// course declaration order.
    pub fn ordered_top(&self, n: usize) -> Vec<EstimationEntry> {
        self.result_set
            .iter()
            .copied()
            .sorted_by(|a, b| match b.value.total_cmp(&a.value) {
                Ordering::Equal => a.degree_course.cmp(&b.degree_course),
                other => other,
            })
            .take(n)
            .collect()
    }
}

/// Sum every estimation of every L1, L2 and L3 item.
///
/// Three flat passes, one per rank; depth carries no weight.
#[instrument(level = "debug", skip(tree))]
pub fn evaluate_tree(tree: &TaxonomyTree) -> EvaluationResult {
    let mut result = EvaluationResult::new();
    calculate_result(&mut result, tree, &tree.load_level_one_nodes());
    calculate_result(&mut result, tree, &tree.load_level_two_nodes());
    calculate_result(&mut result, tree, &tree.load_level_three_nodes());
    debug!("evaluated tree: {:?}", result.get_ordered_result());
    result
}

fn calculate_result(result: &mut EvaluationResult, tree: &TaxonomyTree, nodes: &[NodeId]) {
    for entry in nodes
        .iter()
        .filter_map(|&n| tree.item(n))
        .flat_map(|item| item.estimations.iter())
    {
        result.add_points_to_course(entry);
    }
}

/// Merge `cmp` into `pers` with the default policy.
pub fn compare_trees_and_update_values(pers: &mut TaxonomyTree, cmp: &TaxonomyTree) {
    pers.merge_from(cmp, MergePolicy::default());
}

pub fn compare_trees_with_policy(pers: &mut TaxonomyTree, cmp: &TaxonomyTree, policy: MergePolicy) {
    pers.merge_from(cmp, policy);
}

/// Reconcile a single pair of same-named L1 branches and refresh relations.
pub fn compare_branches_and_update_values(
    pers: &mut TaxonomyTree,
    pers_branch: NodeId,
    cmp: &TaxonomyTree,
    cmp_branch: NodeId,
) {
    pers.reconcile_branch(pers_branch, cmp, cmp_branch, MergePolicy::default());
    pers.rebuild_relations();
}

/// Combine two detached node lists without repeating a name.
///
/// Same-named pairs first raise each other's scores to the max, then the
/// lists are concatenated and only the first node per name is kept.
pub fn add_children_without_duplicate(
    mut first: Vec<NodeRecord>,
    mut second: Vec<NodeRecord>,
) -> Vec<NodeRecord> {
    for a in first.iter_mut() {
        for b in second.iter_mut().filter(|b| b.item.name == a.item.name) {
            a.item.estimations.reconcile_max(&b.item.estimations);
            b.item.estimations.reconcile_max(&a.item.estimations);
        }
    }
    first
        .into_iter()
        .chain(second)
        .unique_by(|n| n.item.name.clone())
        .collect()
}
