//! Taxonomy tree engine for degree-course recommendations.
//!
//! A fixed-depth taxonomy (root → L1 → L2 → L3) whose nodes carry per-course
//! affinity scores. The crate reconstructs trees from their JSON document,
//! merges an incoming tree into a persisted one, and aggregates a tree into a
//! ranked recommendation.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod util;

pub use domain::{
    evaluate_tree, DegreeCourse, EstimationEntry, EstimationSet, EvaluationResult, Level,
    MergePolicy, NodeId, NodeRecord, TaxonomyItem, TaxonomyNode, TaxonomyTree, TreeRecord,
};
