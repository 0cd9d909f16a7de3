//! Tree assembly service
//!
//! Two phases separated by a barrier:
//! 1. every CSV below the root is built into a cluster leaf on a worker pool,
//!    results keyed by cluster name;
//! 2. a sequential walk of pillar/parent/[subtopic] directories re-attaches the
//!    leaves by name and aggregates each branch once its children are final.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::application::services::cluster::ClusterBuilder;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    Aggregate, Branch, ClusterNode, DomainError, SquarifiedDocument, StatsCollector, TreeNode,
};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::PathExt;

/// Service assembling the squarified tree from a taxonomy directory.
pub struct TreeAssembler {
    fs: Arc<dyn FileSystem>,
    builder: ClusterBuilder,
    /// Worker threads for extraction; 0 uses all available cores
    workers: usize,
}

impl TreeAssembler {
    pub fn new(fs: Arc<dyn FileSystem>, builder: ClusterBuilder, workers: usize) -> Self {
        Self {
            fs,
            builder,
            workers,
        }
    }

    /// Build the full document for the taxonomy rooted at `base`.
    ///
    /// Fails only when `base` is not a directory or holds no CSV files at all.
    #[instrument(level = "debug", skip(self))]
    pub fn assemble(&self, base: &Path) -> ApplicationResult<SquarifiedDocument> {
        if !self.fs.is_dir(base) {
            return Err(DomainError::NotADirectory(base.to_path_buf()).into());
        }

        let files = self.discover(base);
        if files.is_empty() {
            return Err(DomainError::NoClusterFiles(base.to_path_buf()).into());
        }
        info!("found {} cluster files in {}", files.len(), base.display());

        let mut stats = StatsCollector::new(files.len());
        let index = self.extract_all(&files, &mut stats)?;
        let data = self.walk(base, &index, &mut stats)?;

        Ok(SquarifiedDocument {
            data,
            statistics: stats.finish(),
        })
    }

    /// Write the document as pretty-printed JSON.
    pub fn save(&self, document: &SquarifiedDocument, path: &Path) -> ApplicationResult<()> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| ApplicationError::failed("serialize output", e))?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create output directory", path)?;
        self.fs
            .write(path, &json)
            .with_path_context("write output", path)?;
        debug!("save: wrote {} bytes to {}", json.len(), path.display());
        Ok(())
    }

    /// All `.csv` files anywhere below `base`.
    fn discover(&self, base: &Path) -> Vec<PathBuf> {
        WalkDir::new(base)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("skipping unreadable entry below {}: {}", base.display(), e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && e.path().is_csv_file())
            .map(|e| e.into_path())
            .collect()
    }

    /// Build every file on the worker pool and index the leaves by name.
    ///
    /// Returns only after every file is processed. Names are unique by
    /// construction; should two files share a stem the first one wins.
    fn extract_all(
        &self,
        files: &[PathBuf],
        stats: &mut StatsCollector,
    ) -> ApplicationResult<HashMap<String, ClusterNode>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("extract-{}", i))
            .build()
            .map_err(|e| ApplicationError::failed("start extraction pool", e))?;
        info!("extracting with {} workers", pool.current_num_threads());

        let total = files.len();
        let done = AtomicUsize::new(0);
        let nodes: Vec<ClusterNode> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let node = self.builder.build(path);
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    info!("extracted {}/{}: {}", n, total, path.display());
                    node
                })
                .collect()
        });

        let mut index = HashMap::with_capacity(nodes.len());
        for node in nodes {
            stats.record_extraction(node.keywords.len());
            match index.entry(node.name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
                Entry::Occupied(_) => {
                    warn!("duplicate cluster name {:?}, keeping the first", node.name);
                }
            }
        }
        Ok(index)
    }

    fn walk(
        &self,
        base: &Path,
        index: &HashMap<String, ClusterNode>,
        stats: &mut StatsCollector,
    ) -> ApplicationResult<Vec<TreeNode>> {
        let mut data = Vec::new();

        for (pillar_name, pillar_path) in self.visible_dirs(base)? {
            let mut pillar = Branch::new(pillar_name);

            for (parent_name, parent_path) in self.visible_dirs(&pillar_path)? {
                let entries = self
                    .fs
                    .list_dir(&parent_path)
                    .with_path_context("list parent", &parent_path)?;
                let has_subtopics = entries.iter().any(|e| self.fs.is_dir(e));
                stats.record_structure(&pillar.name, &parent_name, has_subtopics);

                let mut parent = Branch::new(parent_name);
                if has_subtopics {
                    for (sub_name, sub_path) in self.visible_dirs(&parent_path)? {
                        let sub_entries = self
                            .fs
                            .list_dir(&sub_path)
                            .with_path_context("list subtopic", &sub_path)?;
                        let subtopic =
                            Branch::with_children(sub_name, attach_clusters(&sub_entries, index));
                        parent.children.extend(close(TreeNode::Subtopic, subtopic));
                    }
                } else {
                    parent.children = attach_clusters(&entries, index);
                }
                pillar.children.extend(close(TreeNode::Parent, parent));
            }
            data.extend(close(TreeNode::Pillar, pillar));
        }

        Ok(data)
    }

    /// Non-hidden subdirectories of `dir` as `(name, path)`, in listing order.
    fn visible_dirs(&self, dir: &Path) -> ApplicationResult<Vec<(String, PathBuf)>> {
        let entries = self
            .fs
            .list_dir(dir)
            .with_path_context("list directory", dir)?;
        Ok(entries
            .into_iter()
            .filter(|p| !p.is_hidden() && self.fs.is_dir(p))
            .map(|p| (p.file_name_lossy(), p))
            .collect())
    }
}

/// Cluster leaves for the `.csv` entries of one directory, in listing order.
fn attach_clusters(entries: &[PathBuf], index: &HashMap<String, ClusterNode>) -> Vec<TreeNode> {
    entries
        .iter()
        .filter_map(|entry| entry.csv_stem())
        .filter_map(|stem| match index.get(stem) {
            Some(node) => Some(TreeNode::Cluster(node.clone())),
            None => {
                debug!("attach_clusters: no extracted cluster named {:?}", stem);
                None
            }
        })
        .collect()
}

/// Aggregate a finished branch, or drop it when nothing was attached.
fn close(kind: fn(Branch) -> TreeNode, branch: Branch) -> Option<TreeNode> {
    if branch.children.is_empty() {
        debug!("close: pruning empty branch {:?}", branch.name);
        return None;
    }
    let mut node = kind(branch);
    node.aggregate();
    Some(node)
}
