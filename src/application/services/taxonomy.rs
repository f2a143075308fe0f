//! Taxonomy tree service
//!
//! Loads and saves tree documents through the filesystem boundary, merges an
//! incoming tree into the persisted one and turns a tree into a recommendation.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{evaluate_tree, EstimationEntry, EvaluationResult, IdGenerator, TaxonomyTree};
use crate::infrastructure::traits::FileSystem;

/// Ranked outcome of evaluating a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Full aggregate over every scored course
    pub result: EvaluationResult,
    /// Best courses, descending
    pub top: Vec<EstimationEntry>,
}

/// Service for loading, merging and evaluating taxonomy trees.
///
/// Every tree the service builds forks its generator from one shared stream,
/// so trees loaded one after another never mint the same ids.
pub struct TaxonomyService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    ids: Mutex<IdGenerator>,
}

impl TaxonomyService {
    /// Create a new taxonomy service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        let ids = Mutex::new(IdGenerator::from_seed(settings.ids.seed));
        Self { fs, settings, ids }
    }

    fn id_generator(&self) -> IdGenerator {
        let mut ids = self.ids.lock().unwrap_or_else(|poisoned| {
            warn!("id generator mutex was poisoned, recovering");
            poisoned.into_inner()
        });
        ids.fork()
    }

    /// Read and reconstruct the tree stored at `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<TaxonomyTree> {
        let content = self.fs.read_to_string(path).or_tree_not_found(path)?;
        let tree = TaxonomyTree::from_json_with(&content, self.id_generator())?;
        debug!("load: {} nodes from {}", tree.len(), path.display());
        Ok(tree)
    }

    /// Like [`load`](Self::load), but a missing file yields the canonical tree.
    pub fn load_or_default(&self, path: &Path) -> ApplicationResult<TaxonomyTree> {
        match self.load(path) {
            Err(ApplicationError::TreeNotFound(_)) => {
                debug!("load_or_default: no tree at {}, using default", path.display());
                Ok(TaxonomyTree::with_generator(self.id_generator()))
            }
            other => other,
        }
    }

    /// Serialize `tree` to `path`, creating parent directories.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, path: &Path, tree: &TaxonomyTree) -> ApplicationResult<()> {
        let json = tree.to_json()?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent dir", path)?;
        self.fs.write(path, &json).with_path_context("write tree", path)?;
        debug!("save: {} nodes to {}", tree.len(), path.display());
        Ok(())
    }

    /// Merge `incoming` into `persisting` using the configured policy.
    pub fn merge(&self, persisting: &mut TaxonomyTree, incoming: &TaxonomyTree) {
        persisting.merge_from(incoming, self.settings.merge.policy);
    }

    /// Merge the tree at `incoming` into the tree at `persisting` and write
    /// the result back to `persisting`.
    ///
    /// A missing persisting file starts from the canonical tree.
    #[instrument(level = "debug", skip(self))]
    pub fn merge_files(
        &self,
        persisting: &Path,
        incoming: &Path,
    ) -> ApplicationResult<TaxonomyTree> {
        let mut tree = self.load_or_default(persisting)?;
        let other = self.load(incoming)?;
        let before = tree.len();
        self.merge(&mut tree, &other);
        info!(
            "merged {} into {}: {} -> {} nodes",
            incoming.display(),
            persisting.display(),
            before,
            tree.len()
        );
        self.save(persisting, &tree)?;
        Ok(tree)
    }

    /// Aggregate `tree` and keep the configured number of best courses.
    pub fn recommend(&self, tree: &TaxonomyTree) -> Recommendation {
        let result = evaluate_tree(tree);
        let top = result.ordered_top(self.settings.ranking.top_n);
        Recommendation { result, top }
    }

    /// Load the tree at `path` and recommend from it.
    pub fn recommend_file(&self, path: &Path) -> ApplicationResult<Recommendation> {
        let tree = self.load(path)?;
        Ok(self.recommend(&tree))
    }

    /// Merge into and recommend from the configured store.
    pub fn ingest(&self, incoming: &Path) -> ApplicationResult<Recommendation> {
        let store = self.settings.store_path.clone();
        let tree = self.merge_files(&store, incoming)?;
        Ok(self.recommend(&tree))
    }
}
