//! Bottom-up rollup of node metrics.
//!
//! Branch averages are weighted by keyword count: each child's average is
//! re-expanded into an implied total before summing, so a child with many
//! keywords is not diluted by a sibling with few.

use crate::domain::entities::Keyword;
use crate::domain::tree::{mean, Branch, ClusterNode, Metrics, TreeNode};

/// Result of aggregating a subtree.
///
/// `keywords` is the flattened, unsorted view of every descendant cluster's
/// keywords; it is handed to the caller and never stored on a branch.
#[derive(Debug)]
pub struct Rollup<'a> {
    pub metrics: Metrics,
    pub keywords: Vec<&'a Keyword>,
}

/// Recompute rollup fields in place.
///
/// Idempotent: aggregating an already aggregated subtree changes nothing.
pub trait Aggregate {
    fn aggregate(&mut self) -> Rollup<'_>;
}

impl Aggregate for ClusterNode {
    fn aggregate(&mut self) -> Rollup<'_> {
        self.keywords
            .sort_by_cached_key(|k| k.keyword.to_lowercase());
        self.metrics = Metrics::from_keywords(&self.keywords);
        Rollup {
            metrics: self.metrics,
            keywords: self.keywords.iter().collect(),
        }
    }
}

impl Aggregate for Branch {
    fn aggregate(&mut self) -> Rollup<'_> {
        let mut sum = WeightedSum::default();
        let mut keywords = Vec::new();
        for child in self.children.iter_mut() {
            let rollup = child.aggregate();
            sum.add(&rollup.metrics);
            keywords.extend(rollup.keywords);
        }
        self.metrics = sum.finish();
        Rollup {
            metrics: self.metrics,
            keywords,
        }
    }
}

impl Aggregate for TreeNode {
    fn aggregate(&mut self) -> Rollup<'_> {
        match self {
            TreeNode::Pillar(b) | TreeNode::Parent(b) | TreeNode::Subtopic(b) => b.aggregate(),
            TreeNode::Cluster(c) => c.aggregate(),
        }
    }
}

/// Owned form of [`Aggregate::aggregate`].
pub fn aggregate(mut node: TreeNode) -> TreeNode {
    node.aggregate();
    node
}

#[derive(Debug, Default)]
struct WeightedSum {
    size: u64,
    total_keywords: u64,
    total_clusters: u64,
    kd_total: f64,
    cpc_total: f64,
}

impl WeightedSum {
    fn add(&mut self, child: &Metrics) {
        let weight = child.total_keywords as f64;
        self.size = self.size.saturating_add(child.size);
        self.total_keywords = self.total_keywords.saturating_add(child.total_keywords);
        self.total_clusters = self.total_clusters.saturating_add(child.total_clusters);
        self.kd_total += child.average_kd * weight;
        self.cpc_total += child.average_cpc * weight;
    }

    fn finish(self) -> Metrics {
        Metrics {
            size: self.size,
            total_keywords: self.total_keywords,
            total_clusters: self.total_clusters,
            average_kd: mean(self.kd_total, self.total_keywords),
            average_cpc: mean(self.cpc_total, self.total_keywords),
        }
    }
}
