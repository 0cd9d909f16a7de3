//! Domain entities: keyword records, cluster metadata and taxonomy position

use serde::{Deserialize, Serialize};

/// Sentinel used for pillar/parent when the path does not reveal them.
pub const UNKNOWN: &str = "Unknown";

/// A validated keyword row as parsed from a cluster CSV.
///
/// Funnel stage and search intent are parse-time enrichments only; they are
/// dropped when the record is carried into the tree as a [`Keyword`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    pub keyword: String,
    pub search_volume: u64,
    pub keyword_difficulty: f64,
    pub cpc: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnel_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_intent: Option<String>,
}

/// Keyword as it appears on a cluster leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub keyword: String,
    pub search_volume: u64,
    pub keyword_difficulty: f64,
    pub cpc: f64,
}

impl Keyword {
    pub fn new(keyword: impl Into<String>, search_volume: u64, keyword_difficulty: f64, cpc: f64) -> Self {
        Self {
            keyword: keyword.into(),
            search_volume,
            keyword_difficulty,
            cpc,
        }
    }
}

impl From<KeywordRecord> for Keyword {
    fn from(record: KeywordRecord) -> Self {
        Self {
            keyword: record.keyword,
            search_volume: record.search_volume,
            keyword_difficulty: record.keyword_difficulty,
            cpc: record.cpc,
        }
    }
}

/// Per-cluster metadata read from the four header lines of a cluster CSV.
///
/// The all-empty value doubles as the sentinel for files that failed to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMetadata {
    pub centroid_keywords: String,
    pub tfidf_keywords: String,
    pub cluster_size: u64,
    pub keyword_diversity_samples: String,
}

impl ClusterMetadata {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Position of a cluster in the pillar/parent/subtopic taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub pillar: String,
    pub parent: String,
    pub subtopic: Option<String>,
    pub cluster: String,
}

/// Header names of the data columns in a cluster CSV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CsvColumns {
    pub keyword: String,
    pub search_volume: String,
    pub keyword_difficulty: String,
    pub cpc: String,
    pub funnel_stage: String,
    pub search_intent: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            keyword: "keyword".into(),
            search_volume: "Semrush_Search Volume".into(),
            keyword_difficulty: "Semrush_Keyword Difficulty".into(),
            cpc: "Semrush_CPC (USD)".into(),
            funnel_stage: "Semrush_Funnel Stage".into(),
            search_intent: "Semrush_Search Intent".into(),
        }
    }
}

impl CsvColumns {
    /// Columns without which a file cannot be extracted.
    pub fn required(&self) -> [&str; 4] {
        [
            &self.keyword,
            &self.search_volume,
            &self.keyword_difficulty,
            &self.cpc,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_metadata_when_checked_then_is_empty_sentinel() {
        assert!(ClusterMetadata::empty().is_empty());
        let meta = ClusterMetadata {
            cluster_size: 3,
            ..ClusterMetadata::default()
        };
        assert!(!meta.is_empty());
    }

    #[test]
    fn given_record_with_enrichments_when_converted_then_keeps_quad_only() {
        let record = KeywordRecord {
            keyword: "rust jobs".into(),
            search_volume: 1200,
            keyword_difficulty: 42.0,
            cpc: 1.5,
            funnel_stage: Some("TOFU".into()),
            search_intent: Some("Informational".into()),
        };

        let keyword = Keyword::from(record);

        assert_eq!(keyword, Keyword::new("rust jobs", 1200, 42.0, 1.5));
        let json = serde_json::to_value(&keyword).unwrap();
        assert_eq!(json["searchVolume"], 1200);
        assert!(json.get("funnelStage").is_none());
    }

    #[test]
    fn given_hierarchy_without_subtopic_when_serialized_then_emits_null() {
        let hierarchy = Hierarchy {
            pillar: "developer".into(),
            parent: "backend".into(),
            subtopic: None,
            cluster: "rust".into(),
        };
        let json = serde_json::to_value(&hierarchy).unwrap();
        assert!(json["subtopic"].is_null());
    }
}
