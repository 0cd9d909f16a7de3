//! End-to-end tests for TreeAssembler over temporary taxonomy directories

use std::path::{Path, PathBuf};

use rstest::rstest;
use tempfile::TempDir;

use clustermap::application::ApplicationError;
use clustermap::config::Settings;
use clustermap::domain::{DomainError, NodeKind, TreeNode};
use clustermap::infrastructure::di::ServiceContainer;
use clustermap::util::testing::{cluster_csv, init_test_setup, write_file};

const ANCHOR: &str = "3.1 Qualified Clusters";

fn container(workers: usize) -> ServiceContainer {
    ServiceContainer::new(Settings {
        workers,
        ..Settings::default()
    })
}

fn base(temp: &TempDir) -> PathBuf {
    temp.path().join(ANCHOR)
}

fn add_cluster(base: &Path, rel: &str, rows: &[(&str, &str, &str, &str)]) {
    write_file(&base.join(rel), &cluster_csv("c", rows.len() as u64, rows));
}

fn find<'a>(nodes: &'a [TreeNode], name: &str) -> &'a TreeNode {
    nodes
        .iter()
        .find(|n| n.name() == name)
        .unwrap_or_else(|| panic!("node {name} not found"))
}

#[rstest]
#[case::single_worker(1)]
#[case::pool(4)]
fn given_mixed_topologies_when_assembling_then_builds_typed_tree(#[case] workers: usize) {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let base = base(&temp);
    add_cluster(&base, "developer/rust/rust_jobs.csv", &[("rust jobs", "100", "10", "1")]);
    add_cluster(&base, "developer/rust/rust_remote.csv", &[("rust remote", "300", "30", "3"), ("rust contract", "100", "10", "1")]);
    add_cluster(&base, "developer/languages/systems/c_jobs.csv", &[("c jobs", "50", "20", "2")]);
    add_cluster(&base, "developer/languages/scripting/python.csv", &[("python", "150", "40", "4")]);

    // Act
    let doc = container(workers).assembler().assemble(&base).unwrap();

    // Assert
    assert_eq!(doc.data.len(), 1);
    let pillar = &doc.data[0];
    assert_eq!(pillar.kind(), NodeKind::Pillar);
    assert_eq!(pillar.metrics().size, 700);
    assert_eq!(pillar.metrics().total_keywords, 5);
    assert_eq!(pillar.metrics().total_clusters, 4);

    let flat = find(pillar.children(), "rust");
    assert_eq!(flat.kind(), NodeKind::Parent);
    assert!(flat.children().iter().all(|c| c.kind() == NodeKind::Cluster));
    assert_eq!(flat.metrics().size, 500);
    assert!((flat.metrics().average_kd - 50.0 / 3.0).abs() < 1e-9);

    let nested = find(pillar.children(), "languages");
    assert_eq!(nested.children().len(), 2);
    assert!(nested.children().iter().all(|c| c.kind() == NodeKind::Subtopic));
    let systems = find(nested.children(), "systems");
    let leaf = systems.children()[0].as_cluster().unwrap();
    assert_eq!(leaf.hierarchy.subtopic.as_deref(), Some("systems"));

    assert_eq!(doc.total_keywords(), 5);
    assert_eq!(doc.statistics.total_files, 4);
    assert_eq!(doc.statistics.processed_files, 4);
    assert_eq!(doc.statistics.error_files, 0);
    assert_eq!(doc.statistics.success_rate, "100.00%");
    assert_eq!(
        doc.statistics.structure_variations,
        vec![
            "developer -> languages -> [Subtopics]".to_string(),
            "developer -> rust".to_string(),
        ]
    );
}

#[test]
fn given_branches_without_clusters_when_assembling_then_they_are_pruned() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let base = base(&temp);
    add_cluster(&base, "hiring/recruiters/agency.csv", &[("agency", "10", "1", "1")]);
    std::fs::create_dir_all(base.join("hiring/empty_parent")).unwrap();
    std::fs::create_dir_all(base.join("hiring/with_subs/empty_sub")).unwrap();
    write_file(&base.join("hiring/notes/readme.txt"), "not a cluster");
    std::fs::create_dir_all(base.join("empty_pillar/parent")).unwrap();

    // Act
    let doc = container(2).assembler().assemble(&base).unwrap();

    // Assert
    assert_eq!(doc.data.len(), 1);
    let pillar = &doc.data[0];
    assert_eq!(pillar.name(), "hiring");
    let parents: Vec<_> = pillar.children().iter().map(|c| c.name()).collect();
    assert_eq!(parents, ["recruiters"]);
}

#[test]
fn given_zero_keyword_file_when_assembling_then_node_kept_and_counted_as_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let base = base(&temp);
    add_cluster(&base, "salary/ranges/full.csv", &[("salary", "40", "10", "2")]);
    add_cluster(&base, "salary/ranges/header_only.csv", &[]);

    // Act
    let doc = container(2).assembler().assemble(&base).unwrap();

    // Assert
    let parent = &doc.data[0].children()[0];
    let empty = find(parent.children(), "header_only");
    assert_eq!(empty.metrics().size, 0);
    assert_eq!(empty.metrics().total_keywords, 0);
    assert_eq!(empty.metrics().average_kd, 0.0);
    assert_eq!(parent.metrics().total_clusters, 2);
    assert!((parent.metrics().average_kd - 10.0).abs() < 1e-9);
    assert_eq!(doc.statistics.processed_files, 1);
    assert_eq!(doc.statistics.error_files, 1);
    assert_eq!(doc.statistics.success_rate, "50.00%");
}

#[test]
fn given_malformed_file_when_assembling_then_batch_continues() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let base = base(&temp);
    add_cluster(&base, "software/crm/good.csv", &[("crm", "80", "5", "1")]);
    write_file(&base.join("software/crm/bad.csv"), "garbage");

    // Act
    let doc = container(2).assembler().assemble(&base).unwrap();

    // Assert
    let crm = &doc.data[0].children()[0];
    assert_eq!(crm.children().len(), 2);
    assert_eq!(crm.metrics().size, 80);
    assert_eq!(doc.statistics.error_files, 1);
}

#[test]
fn given_out_of_range_volume_when_assembling_then_only_that_file_fails() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let base = base(&temp);
    add_cluster(&base, "software/crm/good.csv", &[("crm", "80", "5", "1")]);
    add_cluster(
        &base,
        "software/crm/huge.csv",
        &[("a", "99999999999999999999", "1", "1"), ("b", "5", "1", "1")],
    );

    // Act
    let doc = container(2).assembler().assemble(&base).unwrap();

    // Assert
    let crm = &doc.data[0].children()[0];
    let huge = find(crm.children(), "huge");
    assert_eq!(huge.metrics().size, 0);
    assert_eq!(huge.metrics().total_keywords, 0);
    assert_eq!(crm.metrics().size, 80);
    assert_eq!(doc.statistics.processed_files, 1);
    assert_eq!(doc.statistics.error_files, 1);
}

#[test]
fn given_csv_directly_under_parent_when_saving_then_subtopic_is_null() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let base = base(&temp);
    add_cluster(&base, "staffing/agencies/temp.csv", &[("temp agency", "10", "1", "1")]);
    let out = temp.path().join("squarified-ready.json");
    let assembler = container(1).assembler();

    // Act
    assembler
        .save(&assembler.assemble(&base).unwrap(), &out)
        .unwrap();

    // Assert
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let hierarchy = &json["data"][0]["children"][0]["children"][0]["hierarchy"];
    assert_eq!(hierarchy["parent"], "agencies");
    assert_eq!(hierarchy["cluster"], "temp");
    assert!(hierarchy.as_object().unwrap().contains_key("subtopic"));
    assert!(hierarchy["subtopic"].is_null());
}

#[test]
fn given_hidden_directories_when_assembling_then_they_are_skipped() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let base = base(&temp);
    add_cluster(&base, "jobs_work/remote/remote.csv", &[("remote", "10", "1", "1")]);
    add_cluster(&base, ".cache/old/stale.csv", &[("stale", "99", "1", "1")]);

    // Act
    let doc = container(1).assembler().assemble(&base).unwrap();

    // Assert
    let names: Vec<_> = doc.data.iter().map(|p| p.name()).collect();
    assert_eq!(names, ["jobs_work"]);
    assert_eq!(doc.statistics.total_files, 2);
}

#[test]
fn given_no_csv_files_when_assembling_then_run_fails() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let base = base(&temp);
    std::fs::create_dir_all(base.join("pillar/parent")).unwrap();

    // Act
    let err = container(1).assembler().assemble(&base).unwrap_err();

    // Assert
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NoClusterFiles(_))
    ));
}

#[test]
fn given_missing_root_when_assembling_then_run_fails() {
    let temp = TempDir::new().unwrap();

    let err = container(1).assembler().assemble(&base(&temp)).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotADirectory(_))
    ));
}

#[test]
fn given_assembled_document_when_saving_then_writes_squarified_json() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let base = base(&temp);
    add_cluster(&base, "databases/sql/postgres.csv", &[("Postgres", "10", "5", "1"), ("mysql", "20", "15", "2")]);
    let out = temp.path().join("out/squarified-ready.json");
    let assembler = container(1).assembler();
    let doc = assembler.assemble(&base).unwrap();

    // Act
    assembler.save(&doc, &out).unwrap();

    // Assert
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let pillar = &json["data"][0];
    assert_eq!(pillar["type"], "pillar");
    assert_eq!(pillar["name"], "databases");
    assert_eq!(pillar["keywords"], serde_json::json!([]));
    let leaf = &pillar["children"][0]["children"][0];
    assert_eq!(leaf["type"], "cluster");
    assert_eq!(leaf["keywords"][0]["keyword"], "mysql");
    assert_eq!(leaf["keywords"][1]["keyword"], "Postgres");
    assert_eq!(leaf["hierarchy"]["parent"], "sql");
    assert_eq!(leaf["metadata"]["cluster_size"], 2);
    assert_eq!(json["statistics"]["total_files"], 1);
    assert_eq!(json["statistics"]["success_rate"], "100.00%");
}
