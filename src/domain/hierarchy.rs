//! Taxonomy position derived from a cluster file's path.

use std::path::{Component, Path};

use tracing::debug;

use crate::domain::entities::{Hierarchy, UNKNOWN};
use crate::util::path::PathExt;

impl Hierarchy {
    /// Read pillar/parent/subtopic from the directories below `anchor`.
    ///
    /// Only directory segments count: a file placed directly in a parent
    /// directory has no subtopic. Missing segments fall back to `Unknown`.
    pub fn from_path(path: &Path, anchor: &str) -> Self {
        let cluster = path.cluster_name();
        let dirs: Vec<String> = path
            .parent()
            .map(|dir| {
                dir.components()
                    .filter_map(|c| match c {
                        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let Some(anchor_idx) = dirs.iter().position(|d| d == anchor) else {
            debug!("from_path: anchor {:?} not in {}", anchor, path.display());
            return Self::unknown(cluster);
        };

        let below = &dirs[anchor_idx + 1..];
        Self {
            pillar: below.first().cloned().unwrap_or_else(|| UNKNOWN.into()),
            parent: below.get(1).cloned().unwrap_or_else(|| UNKNOWN.into()),
            subtopic: below.get(2).cloned(),
            cluster,
        }
    }

    /// Fallback position for a cluster whose path reveals nothing.
    pub fn unknown(cluster: impl Into<String>) -> Self {
        Self {
            pillar: UNKNOWN.into(),
            parent: UNKNOWN.into(),
            subtopic: None,
            cluster: cluster.into(),
        }
    }
}
