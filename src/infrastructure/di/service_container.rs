//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{
    ClusterBuilder, KeywordExtractor, PillarNameService, TreeAssembler,
};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding settings and the shared I/O boundary.
///
/// Services are cheap to construct and built on demand.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    pub fn extractor(&self) -> KeywordExtractor {
        KeywordExtractor::new(self.fs.clone(), self.settings.columns.clone())
    }

    pub fn assembler(&self) -> TreeAssembler {
        let builder = ClusterBuilder::new(self.extractor(), self.settings.anchor_dir.clone());
        TreeAssembler::new(self.fs.clone(), builder, self.settings.workers)
    }

    pub fn renamer(&self) -> PillarNameService {
        PillarNameService::new(self.fs.clone(), self.settings.pillar_names.clone())
    }
}
