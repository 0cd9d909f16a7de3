use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // RUST_LOG wins, otherwise everything from this crate
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("clustermap=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &std::path::Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, content).expect("write test file");
}

/// Cluster CSV in the export layout: four `#` metadata lines, then the table.
///
/// Cells are written verbatim, quote them yourself when they contain commas.
pub fn cluster_csv(centroid: &str, size: u64, rows: &[(&str, &str, &str, &str)]) -> String {
    let mut out = format!(
        "# centroid_keywords: {centroid}\n\
         # tfidf_keywords: {centroid}\n\
         # cluster_size: {size}\n\
         # keyword_diversity_samples_in_cluster: {centroid}\n\
         keyword,Semrush_Search Volume,Semrush_Keyword Difficulty,Semrush_CPC (USD),Semrush_Funnel Stage,Semrush_Search Intent\n"
    );
    for (keyword, volume, kd, cpc) in rows {
        out.push_str(&format!("{keyword},{volume},{kd},{cpc},,\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_rows_when_building_cluster_csv_then_has_metadata_and_header() {
        let csv = cluster_csv("rust", 2, &[("rust jobs", "100", "40", "1.5")]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "# centroid_keywords: rust");
        assert_eq!(lines[2], "# cluster_size: 2");
        assert!(lines[4].starts_with("keyword,Semrush_Search Volume"));
        assert_eq!(lines[5], "rust jobs,100,40,1.5,,");
    }
}
