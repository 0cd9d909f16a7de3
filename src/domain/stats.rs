//! Run statistics reported next to the tree.

use itertools::Itertools;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub total_files: usize,
    pub processed_files: usize,
    pub error_files: usize,
    /// Percentage with two decimals, e.g. `"87.50%"`
    pub success_rate: String,
    /// Sorted, de-duplicated `"<pillar> -> <parent>[ -> [Subtopics]]"` entries
    pub structure_variations: Vec<String>,
}

/// Accumulates statistics while a run progresses.
///
/// A file counts as processed when it yielded at least one keyword; a
/// well-formed but empty file is counted as an error file.
#[derive(Debug, Default)]
pub struct StatsCollector {
    total_files: usize,
    processed_files: usize,
    error_files: usize,
    structures: Vec<String>,
}

impl StatsCollector {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            ..Self::default()
        }
    }

    pub fn record_extraction(&mut self, keyword_count: usize) {
        if keyword_count > 0 {
            self.processed_files += 1;
        } else {
            self.error_files += 1;
        }
    }

    pub fn record_structure(&mut self, pillar: &str, parent: &str, has_subtopics: bool) {
        let mut entry = format!("{} -> {}", pillar, parent);
        if has_subtopics {
            entry.push_str(" -> [Subtopics]");
        }
        self.structures.push(entry);
    }

    pub fn finish(self) -> RunStatistics {
        let rate = if self.total_files == 0 {
            0.0
        } else {
            self.processed_files as f64 / self.total_files as f64 * 100.0
        };
        RunStatistics {
            total_files: self.total_files,
            processed_files: self.processed_files,
            error_files: self.error_files,
            success_rate: format!("{:.2}%", rate),
            structure_variations: self.structures.into_iter().unique().sorted().collect(),
        }
    }
}
