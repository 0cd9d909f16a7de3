//! Domain layer: taxonomy tree, CSV parsing and rollup arithmetic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod parser;
pub mod stats;
pub mod tree;

pub use aggregate::{aggregate, Aggregate, Rollup};
pub use entities::*;
pub use error::{DomainError, ExtractError};
pub use parser::{parse_cluster_csv, ParsedCluster, RejectedRow};
pub use stats::{RunStatistics, StatsCollector};
pub use tree::{Branch, ClusterNode, Metrics, NodeKind, SquarifiedDocument, TreeNode};
