//! Cluster node builder
//!
//! Combines a file's extraction with its taxonomy position into a tree leaf.

use std::path::Path;

use tracing::debug;

use crate::application::services::extractor::KeywordExtractor;
use crate::domain::{ClusterNode, Hierarchy, Keyword};

/// Service building one cluster leaf per CSV file.
///
/// Never fails: a file that cannot be read becomes a leaf with empty
/// metadata and zero metrics, and an unexpected path gets the fallback
/// hierarchy.
pub struct ClusterBuilder {
    extractor: KeywordExtractor,
    anchor: String,
}

impl ClusterBuilder {
    pub fn new(extractor: KeywordExtractor, anchor: impl Into<String>) -> Self {
        Self {
            extractor,
            anchor: anchor.into(),
        }
    }

    pub fn build(&self, path: &Path) -> ClusterNode {
        let hierarchy = Hierarchy::from_path(path, &self.anchor);
        let extraction = self.extractor.extract(path);
        let keywords: Vec<Keyword> = extraction.keywords.into_iter().map(Keyword::from).collect();

        let node = ClusterNode::new(hierarchy, extraction.metadata, keywords);
        debug!(
            "build: cluster={} keywords={} size={}",
            node.name, node.metrics.total_keywords, node.metrics.size
        );
        node
    }
}
