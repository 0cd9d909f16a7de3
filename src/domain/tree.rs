//! Taxonomy tree: branch nodes (pillar, parent, subtopic) and cluster leaves.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::domain::entities::{ClusterMetadata, Hierarchy, Keyword};
use crate::domain::stats::RunStatistics;

/// Rollup fields carried by every node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    /// Total search volume
    pub size: u64,
    #[serde(rename = "totalKeywords")]
    pub total_keywords: u64,
    #[serde(rename = "totalClusters")]
    pub total_clusters: u64,
    #[serde(rename = "averageKD")]
    pub average_kd: f64,
    #[serde(rename = "averageCPC")]
    pub average_cpc: f64,
}

impl Metrics {
    /// Self-rollup over a cluster's own keywords (plain arithmetic means).
    ///
    /// Volume sums saturate at `u64::MAX`.
    pub fn from_keywords(keywords: &[Keyword]) -> Self {
        let count = keywords.len() as u64;
        let (size, kd, cpc) = keywords.iter().fold((0u64, 0.0, 0.0), |(size, kd, cpc), k| {
            (size.saturating_add(k.search_volume), kd + k.keyword_difficulty, cpc + k.cpc)
        });
        Self {
            size,
            total_keywords: count,
            total_clusters: 1,
            average_kd: mean(kd, count),
            average_cpc: mean(cpc, count),
        }
    }
}

pub(crate) fn mean(total: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Branches never surface keywords; they serialize an empty list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoKeywords;

impl Serialize for NoKeywords {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_seq(Some(0))?.end()
    }
}

/// Pillar, parent or subtopic node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub name: String,
    pub children: Vec<TreeNode>,
    pub keywords: NoKeywords,
    #[serde(flatten)]
    pub metrics: Metrics,
}

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            keywords: NoKeywords,
            metrics: Metrics::default(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            children,
            ..Self::new(name)
        }
    }
}

/// Leaf built from exactly one cluster CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterNode {
    pub name: String,
    pub hierarchy: Hierarchy,
    pub metadata: ClusterMetadata,
    pub keywords: Vec<Keyword>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

impl ClusterNode {
    /// Create a leaf with its pre-aggregation self-rollup.
    pub fn new(hierarchy: Hierarchy, metadata: ClusterMetadata, keywords: Vec<Keyword>) -> Self {
        let metrics = Metrics::from_keywords(&keywords);
        Self {
            name: hierarchy.cluster.clone(),
            hierarchy,
            metadata,
            keywords,
            metrics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Pillar,
    Parent,
    Subtopic,
    Cluster,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Pillar => "pillar",
            NodeKind::Parent => "parent",
            NodeKind::Subtopic => "subtopic",
            NodeKind::Cluster => "cluster",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Pillar(Branch),
    Parent(Branch),
    Subtopic(Branch),
    Cluster(ClusterNode),
}

impl TreeNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::Pillar(_) => NodeKind::Pillar,
            TreeNode::Parent(_) => NodeKind::Parent,
            TreeNode::Subtopic(_) => NodeKind::Subtopic,
            TreeNode::Cluster(_) => NodeKind::Cluster,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::Pillar(b) | TreeNode::Parent(b) | TreeNode::Subtopic(b) => &b.name,
            TreeNode::Cluster(c) => &c.name,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        match self {
            TreeNode::Pillar(b) | TreeNode::Parent(b) | TreeNode::Subtopic(b) => &b.metrics,
            TreeNode::Cluster(c) => &c.metrics,
        }
    }

    /// Child nodes; always empty for clusters.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Pillar(b) | TreeNode::Parent(b) | TreeNode::Subtopic(b) => &b.children,
            TreeNode::Cluster(_) => &[],
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterNode> {
        match self {
            TreeNode::Cluster(c) => Some(c),
            _ => None,
        }
    }

    /// Every cluster leaf below (or at) this node, depth first.
    pub fn clusters(&self) -> Vec<&ClusterNode> {
        match self {
            TreeNode::Cluster(c) => vec![c],
            _ => self.children().iter().flat_map(TreeNode::clusters).collect(),
        }
    }
}

/// Output document written to `squarified-ready.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquarifiedDocument {
    pub data: Vec<TreeNode>,
    pub statistics: RunStatistics,
}

impl SquarifiedDocument {
    pub fn total_keywords(&self) -> u64 {
        self.data.iter().map(|p| p.metrics().total_keywords).sum()
    }
}
