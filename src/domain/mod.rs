//! Domain layer: the taxonomy tree engine
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod course;
pub mod error;
pub mod estimation;
pub mod evaluator;
pub mod ids;
pub mod item;
pub mod merge;
pub mod node;
pub mod record;
pub mod render;
pub mod tree;

pub use course::{DegreeCourse, Level};
pub use error::{DomainError, DomainResult};
pub use estimation::{EstimationEntry, EstimationSet};
pub use evaluator::{
    add_children_without_duplicate, compare_branches_and_update_values,
    compare_trees_and_update_values, compare_trees_with_policy, evaluate_tree, EvaluationResult,
};
pub use ids::IdGenerator;
pub use item::TaxonomyItem;
pub use merge::MergePolicy;
pub use node::{NodeId, TaxonomyNode};
pub use record::{NodeRecord, TreeRecord};
pub use render::TreeNodeConvert;
pub use tree::TaxonomyTree;
