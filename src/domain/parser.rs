//! Cluster CSV parsing.
//!
//! Layout: four `# key: value` metadata lines, the column header on line 5,
//! keyword rows from line 6. Parsing is pure; the caller reads the file and
//! logs the rejected rows.

use csv::{ReaderBuilder, StringRecord};

use crate::domain::entities::{ClusterMetadata, CsvColumns, KeywordRecord};
use crate::domain::error::ExtractError;

pub const CENTROID_PREFIX: &str = "# centroid_keywords: ";
pub const TFIDF_PREFIX: &str = "# tfidf_keywords: ";
pub const CLUSTER_SIZE_PREFIX: &str = "# cluster_size: ";
pub const DIVERSITY_PREFIX: &str = "# keyword_diversity_samples_in_cluster: ";

const METADATA_FIELDS: [&str; 4] = [
    "centroid_keywords",
    "tfidf_keywords",
    "cluster_size",
    "keyword_diversity_samples",
];

/// A row that was dropped without failing the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 0-based index of the data row
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCluster {
    pub metadata: ClusterMetadata,
    pub keywords: Vec<KeywordRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Parse one cluster CSV.
///
/// File-level problems (short metadata block, bad `cluster_size`, missing
/// required columns, an unparseable search volume anywhere in the column)
/// are errors. Rows with a blank keyword are skipped silently; rows that fail
/// decoding or carry more cells than the header are reported in
/// [`ParsedCluster::rejected`].
pub fn parse_cluster_csv(content: &str, columns: &CsvColumns) -> Result<ParsedCluster, ExtractError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let (meta_lines, body) = split_metadata(content)?;
    let metadata = parse_metadata(&meta_lines)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| ExtractError::Header(e.to_string()))?
        .clone();
    let index = ColumnIndex::resolve(&headers, columns)?;

    let mut keywords = Vec::new();
    let mut rejected = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                rejected.push(RejectedRow {
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if record.len() > headers.len() {
            rejected.push(RejectedRow {
                row,
                reason: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    record.len()
                ),
            });
            continue;
        }

        let raw_volume = index.cell(&record, Some(index.search_volume));
        let search_volume =
            parse_search_volume(raw_volume).ok_or_else(|| ExtractError::InvalidSearchVolume {
                row,
                value: raw_volume.to_string(),
            })?;

        let keyword = index.cell(&record, Some(index.keyword)).trim();
        if keyword.is_empty() {
            continue;
        }

        keywords.push(KeywordRecord {
            keyword: keyword.to_string(),
            search_volume,
            keyword_difficulty: parse_lenient_float(index.cell(&record, Some(index.keyword_difficulty))),
            cpc: parse_lenient_float(index.cell(&record, Some(index.cpc))),
            funnel_stage: optional_text(index.cell(&record, index.funnel_stage)),
            search_intent: optional_text(index.cell(&record, index.search_intent)),
        });
    }

    Ok(ParsedCluster {
        metadata,
        keywords,
        rejected,
    })
}

/// Split off the four metadata lines; the remainder starts at the column header.
fn split_metadata(content: &str) -> Result<([&str; 4], &str), ExtractError> {
    let mut lines = [""; 4];
    let mut rest = content;
    for (i, slot) in lines.iter_mut().enumerate() {
        let missing = ExtractError::MissingMetadata {
            line: i + 1,
            field: METADATA_FIELDS[i],
        };
        if rest.is_empty() {
            return Err(missing);
        }
        let (line, tail) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };
        *slot = line;
        rest = tail;
    }
    if rest.trim().is_empty() {
        return Err(ExtractError::Header("missing column header line".into()));
    }
    Ok((lines, rest))
}

fn parse_metadata(lines: &[&str; 4]) -> Result<ClusterMetadata, ExtractError> {
    let value = |line: &str, prefix: &str| line.replace(prefix, "").trim().to_string();

    let raw_size = value(lines[2], CLUSTER_SIZE_PREFIX);
    let cluster_size = raw_size
        .parse::<u64>()
        .map_err(|_| ExtractError::InvalidClusterSize(raw_size.clone()))?;

    Ok(ClusterMetadata {
        centroid_keywords: value(lines[0], CENTROID_PREFIX),
        tfidf_keywords: value(lines[1], TFIDF_PREFIX),
        cluster_size,
        keyword_diversity_samples: value(lines[3], DIVERSITY_PREFIX),
    })
}

/// 2^64, exclusive upper bound for a volume read through `f64`.
const U64_LIMIT: f64 = u64::MAX as f64;

/// Search volume: thousands separators stripped, blank is 0, fractional values
/// truncate. Negative, out-of-range or non-numeric values are rejected.
pub fn parse_search_volume(raw: &str) -> Option<u64> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Some(0);
    }
    if let Ok(v) = cleaned.parse::<u64>() {
        return Some(v);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v < U64_LIMIT => Some(v.trunc() as u64),
        _ => None,
    }
}

/// Keyword difficulty and CPC: blank, unparseable or non-finite become 0.
pub fn parse_lenient_float(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

struct ColumnIndex {
    keyword: usize,
    search_volume: usize,
    keyword_difficulty: usize,
    cpc: usize,
    funnel_stage: Option<usize>,
    search_intent: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &CsvColumns) -> Result<Self, ExtractError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = columns
            .required()
            .into_iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();

        match (
            find(&columns.keyword),
            find(&columns.search_volume),
            find(&columns.keyword_difficulty),
            find(&columns.cpc),
        ) {
            (Some(keyword), Some(search_volume), Some(keyword_difficulty), Some(cpc)) => Ok(Self {
                keyword,
                search_volume,
                keyword_difficulty,
                cpc,
                funnel_stage: find(&columns.funnel_stage),
                search_intent: find(&columns.search_intent),
            }),
            _ => Err(ExtractError::MissingColumns(missing)),
        }
    }

    /// Cell content, empty when the column is absent or the row is short.
    fn cell<'r>(&self, record: &'r StringRecord, idx: Option<usize>) -> &'r str {
        idx.and_then(|i| record.get(i)).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HEADER: &str = "# centroid_keywords: rust, jobs\n\
# tfidf_keywords: rust developer\n\
# cluster_size: 3\n\
# keyword_diversity_samples_in_cluster: rust jobs | rust remote\n";

    fn csv(body: &str) -> String {
        format!(
            "{HEADER}keyword,Semrush_Search Volume,Semrush_Keyword Difficulty,Semrush_CPC (USD),Semrush_Search Intent\n{body}"
        )
    }

    #[test]
    fn given_well_formed_file_when_parsing_then_reads_metadata_and_rows() {
        let content = csv("rust jobs,\"1,200\",45,2.5,Commercial\n  rust remote  ,90,,abc,\n");

        let parsed = parse_cluster_csv(&content, &CsvColumns::default()).unwrap();

        assert_eq!(parsed.metadata.centroid_keywords, "rust, jobs");
        assert_eq!(parsed.metadata.tfidf_keywords, "rust developer");
        assert_eq!(parsed.metadata.cluster_size, 3);
        assert_eq!(parsed.metadata.keyword_diversity_samples, "rust jobs | rust remote");
        assert_eq!(parsed.keywords.len(), 2);

        let first = &parsed.keywords[0];
        assert_eq!(first.keyword, "rust jobs");
        assert_eq!(first.search_volume, 1200);
        assert_eq!(first.keyword_difficulty, 45.0);
        assert_eq!(first.cpc, 2.5);
        assert_eq!(first.search_intent.as_deref(), Some("Commercial"));
        assert_eq!(first.funnel_stage, None);

        let second = &parsed.keywords[1];
        assert_eq!(second.keyword, "rust remote");
        assert_eq!(second.keyword_difficulty, 0.0);
        assert_eq!(second.cpc, 0.0);
        assert_eq!(second.search_intent, None);
    }

    #[test]
    fn given_blank_keyword_rows_when_parsing_then_skips_silently() {
        let content = csv("   ,100,1,1,\n,200,1,1,\nreal,5,1,1,\n");

        let parsed = parse_cluster_csv(&content, &CsvColumns::default()).unwrap();

        assert_eq!(parsed.keywords.len(), 1);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn given_header_only_file_when_parsing_then_yields_no_keywords() {
        let parsed = parse_cluster_csv(&csv(""), &CsvColumns::default()).unwrap();
        assert!(parsed.keywords.is_empty());
        assert_eq!(parsed.metadata.cluster_size, 3);
    }

    #[test]
    fn given_missing_columns_when_parsing_then_names_them() {
        let content = format!("{HEADER}keyword,Semrush_Search Volume\nx,1\n");

        let err = parse_cluster_csv(&content, &CsvColumns::default()).unwrap_err();

        assert_eq!(
            err,
            ExtractError::MissingColumns(vec![
                "Semrush_Keyword Difficulty".to_string(),
                "Semrush_CPC (USD)".to_string(),
            ])
        );
    }

    #[test]
    fn given_unparseable_volume_when_parsing_then_file_fails() {
        let content = csv("good,10,1,1,\nbad,lots,1,1,\n");

        let err = parse_cluster_csv(&content, &CsvColumns::default()).unwrap_err();

        assert!(matches!(err, ExtractError::InvalidSearchVolume { row: 1, .. }));
    }

    #[test]
    fn given_bad_cluster_size_when_parsing_then_file_fails() {
        let content = "# centroid_keywords: a\n# tfidf_keywords: b\n# cluster_size: many\n# keyword_diversity_samples_in_cluster: c\nkeyword\n";

        let err = parse_cluster_csv(content, &CsvColumns::default()).unwrap_err();

        assert_eq!(err, ExtractError::InvalidClusterSize("many".into()));
    }

    #[test]
    fn given_truncated_metadata_when_parsing_then_reports_missing_line() {
        let content = "# centroid_keywords: a\n# tfidf_keywords: b\n";

        let err = parse_cluster_csv(content, &CsvColumns::default()).unwrap_err();

        assert!(matches!(err, ExtractError::MissingMetadata { line: 3, .. }));
    }

    #[test]
    fn given_short_row_when_parsing_then_missing_cells_default() {
        let content = csv("short,7\n");

        let parsed = parse_cluster_csv(&content, &CsvColumns::default()).unwrap();

        assert_eq!(parsed.keywords.len(), 1);
        assert_eq!(parsed.keywords[0].search_volume, 7);
        assert_eq!(parsed.keywords[0].keyword_difficulty, 0.0);
    }

    #[test]
    fn given_row_longer_than_header_when_parsing_then_rejects_row() {
        let content = csv("rust jobs,1,200,45,2.5,Commercial\nrust remote,90,10,1.5,\n");

        let parsed = parse_cluster_csv(&content, &CsvColumns::default()).unwrap();

        assert_eq!(parsed.keywords.len(), 1);
        assert_eq!(parsed.keywords[0].keyword, "rust remote");
        assert_eq!(
            parsed.rejected,
            vec![RejectedRow {
                row: 0,
                reason: "expected 5 fields, found 6".into(),
            }]
        );
    }

    #[rstest]
    #[case("", Some(0))]
    #[case("  ", Some(0))]
    #[case("1,234", Some(1234))]
    #[case("1,234,567", Some(1_234_567))]
    #[case("12.9", Some(12))]
    #[case("1e3", Some(1000))]
    #[case("-5", None)]
    #[case("n/a", None)]
    #[case("NaN", None)]
    #[case("99999999999999999999", None)]
    #[case("1e30", None)]
    #[case("18446744073709551615", Some(u64::MAX))]
    fn test_parse_search_volume(#[case] raw: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_search_volume(raw), expected);
    }

    #[rstest]
    #[case("", 0.0)]
    #[case("42.5", 42.5)]
    #[case(" 7 ", 7.0)]
    #[case("n/a", 0.0)]
    #[case("inf", 0.0)]
    fn test_parse_lenient_float(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(parse_lenient_float(raw), expected);
    }
}
