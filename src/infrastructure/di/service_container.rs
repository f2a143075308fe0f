//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::TaxonomyService;
use crate::config::Settings;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub taxonomy: TaxonomyService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Load layered settings (optionally with a local config dir) and wire services.
    pub fn load(local_dir: Option<&Path>) -> InfraResult<Self> {
        let settings = Settings::load(local_dir)?;
        debug!("settings loaded: store_path={}", settings.store_path.display());
        Ok(Self::new(settings))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let taxonomy = TaxonomyService::new(Arc::clone(&fs), Arc::clone(&settings));

        Self {
            settings,
            fs,
            taxonomy,
        }
    }

    /// Make sure the directory of the configured tree document exists.
    pub fn ensure_store_dir(&self) -> InfraResult<()> {
        let path = &self.settings.store_path;
        self.fs
            .ensure_parent(path)
            .map_err(|e| InfraError::io(format!("create store dir for {}", path.display()), e))
    }
}
