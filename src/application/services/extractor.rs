//! Keyword extraction service
//!
//! Reads one cluster CSV and turns it into a validated keyword set plus its
//! metadata. File-level failures are folded into an empty extraction.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::application::hash::integrity_hash;
use crate::domain::{parse_cluster_csv, ClusterMetadata, CsvColumns, ExtractError, KeywordRecord};
use crate::infrastructure::traits::FileSystem;

/// Keywords and metadata extracted from one cluster file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub keywords: Vec<KeywordRecord>,
    pub total_keywords: usize,
    pub total_search_volume: u64,
    pub metadata: ClusterMetadata,
    pub integrity_hash: String,
}

/// The hashed part of an extraction.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashPayload<'a> {
    keywords: &'a [KeywordRecord],
    total_keywords: usize,
    total_search_volume: u64,
    metadata: &'a ClusterMetadata,
}

impl Extraction {
    pub fn new(keywords: Vec<KeywordRecord>, metadata: ClusterMetadata) -> Result<Self, ExtractError> {
        let total_keywords = keywords.len();
        let total_search_volume = keywords
            .iter()
            .fold(0u64, |acc, k| acc.saturating_add(k.search_volume));
        let integrity_hash = integrity_hash(&HashPayload {
            keywords: &keywords,
            total_keywords,
            total_search_volume,
            metadata: &metadata,
        })
        .map_err(|e| ExtractError::Integrity(e.to_string()))?;

        Ok(Self {
            keywords,
            total_keywords,
            total_search_volume,
            metadata,
            integrity_hash,
        })
    }

    /// Result shape for a file that could not be extracted.
    pub fn empty() -> Self {
        let metadata = ClusterMetadata::empty();
        let integrity_hash = integrity_hash(&HashPayload {
            keywords: &[],
            total_keywords: 0,
            total_search_volume: 0,
            metadata: &metadata,
        })
        .unwrap_or_default();

        Self {
            keywords: Vec::new(),
            total_keywords: 0,
            total_search_volume: 0,
            metadata,
            integrity_hash,
        }
    }

    /// Empty metadata and no keywords: how callers recognise a failed file.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.metadata.is_empty()
    }
}

/// Service extracting keyword records from cluster CSV files.
pub struct KeywordExtractor {
    fs: Arc<dyn FileSystem>,
    columns: CsvColumns,
}

impl KeywordExtractor {
    pub fn new(fs: Arc<dyn FileSystem>, columns: CsvColumns) -> Self {
        Self { fs, columns }
    }

    /// Extract a file, reporting why it failed.
    ///
    /// Rejected rows are logged as warnings and do not fail the file.
    pub fn try_extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        debug!("try_extract: path={}", path.display());
        if !self.fs.exists(path) {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| ExtractError::Unreadable(e.to_string()))?;

        let parsed = parse_cluster_csv(&content, &self.columns)?;
        for rejected in &parsed.rejected {
            warn!(
                "{}: skipped row {}: {}",
                path.display(),
                rejected.row,
                rejected.reason
            );
        }

        Extraction::new(parsed.keywords, parsed.metadata)
    }

    /// Extract a file, folding any failure into [`Extraction::empty`].
    pub fn extract(&self, path: &Path) -> Extraction {
        match self.try_extract(path) {
            Ok(extraction) => {
                debug!(
                    "extract: {} keywords, volume {} from {}",
                    extraction.total_keywords,
                    extraction.total_search_volume,
                    path.display()
                );
                extraction
            }
            Err(e) => {
                warn!("error reading CSV file {}: {}", path.display(), e);
                Extraction::empty()
            }
        }
    }
}
