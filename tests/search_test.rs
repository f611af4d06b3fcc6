//! Search engine tests against the sample report.

use std::path::Path;
use std::sync::Arc;

use rstest::{fixture, rstest};

use srview::application::services::{Report, ReportService};
use srview::domain::{DomainError, NodeId, SearchCriteria, TreeBuilder};
use srview::infrastructure::json::JsonDocumentLoader;
use srview::infrastructure::traits::RealFileSystem;
use srview::util::testing;

#[fixture]
fn report() -> Report {
    testing::init_test_setup();
    let loader = Arc::new(JsonDocumentLoader::new(Arc::new(RealFileSystem)));
    ReportService::new(loader, TreeBuilder::new())
        .open(Path::new("tests/resources/structured_report.json"))
        .expect("sample report loads")
}

fn ids(nodes: &[&srview::domain::Node]) -> Vec<usize> {
    nodes.iter().map(|n| n.id.0).collect()
}

// ============================================================
// Text search
// ============================================================

#[rstest]
#[case("lung")]
#[case("LUNG")]
#[case("Right Lung")]
fn given_term_in_any_case_when_searching_text_then_finds_description(
    report: Report,
    #[case] term: &str,
) {
    let results = report.search().search_text(term).unwrap();
    assert_eq!(ids(&results), vec![3]);
}

#[rstest]
fn given_section_term_when_searching_text_then_returns_pre_order(report: Report) {
    let results = report.search().search_text("section").unwrap();
    assert_eq!(ids(&results), vec![2, 6]);
}

#[rstest]
fn given_code_value_when_searching_text_then_matches_composed_value(report: Report) {
    // Concept codes are part of the composed value
    let results = report.search().search_text("112039").unwrap();
    assert_eq!(ids(&results), vec![7]);
}

#[rstest]
fn given_term_matching_nothing_when_searching_text_then_empty(report: Report) {
    let results = report.search().search_text("liver").unwrap();
    assert!(results.is_empty());
}

#[rstest]
#[case("")]
#[case("   ")]
fn given_blank_term_when_searching_text_then_invalid_query(report: Report, #[case] term: &str) {
    let result = report.search().search_text(term);
    assert!(matches!(result, Err(DomainError::InvalidQuery(_))));
}

// ============================================================
// Type and relationship search
// ============================================================

#[rstest]
#[case("TEXT", vec![3, 8])]
#[case("text", vec![3, 8])]
#[case("Container", vec![1, 2, 6])]
#[case("NUM", vec![7])]
#[case("ROOT", vec![0])]
#[case("SCOORD", vec![])]
fn given_value_type_when_searching_by_type_then_case_insensitive(
    report: Report,
    #[case] value_type: &str,
    #[case] expected: Vec<usize>,
) {
    assert_eq!(ids(&report.search().search_by_type(value_type)), expected);
}

#[rstest]
fn given_relationship_when_searching_then_root_and_top_container_never_match(report: Report) {
    let contains = report.search().search_by_relationship("contains");
    assert_eq!(ids(&contains), vec![2, 3, 4, 5, 6, 7]);

    let properties = report.search().search_by_relationship("HAS PROPERTIES");
    assert_eq!(ids(&properties), vec![8]);
}

// ============================================================
// Advanced search
// ============================================================

#[rstest]
fn given_empty_criteria_when_advanced_search_then_returns_all_nodes(report: Report) {
    let results = report.search().advanced_search(&SearchCriteria::new());
    assert_eq!(results.len(), 9);
    assert_eq!(results.len(), report.search().all_nodes().len());
}

#[rstest]
fn given_blank_criteria_when_advanced_search_then_treated_as_unset(report: Report) {
    let criteria = SearchCriteria::new().with_text("  ").with_type("");
    assert!(criteria.is_empty());
    assert_eq!(report.search().advanced_search(&criteria).len(), 9);
}

#[rstest]
fn given_text_and_type_when_advanced_search_then_narrows_text_results(report: Report) {
    let engine = report.search();
    let criteria = SearchCriteria::new().with_text("dcm").with_type("TEXT");

    let advanced = engine.advanced_search(&criteria);
    let by_text = engine.search_text("dcm").unwrap();

    assert_eq!(ids(&advanced), vec![3, 8]);
    assert!(advanced.iter().all(|n| by_text.iter().any(|t| t.id == n.id)));
}

#[rstest]
fn given_all_criteria_when_advanced_search_then_applies_each(report: Report) {
    let criteria = SearchCriteria::new()
        .with_text("automated")
        .with_type("text")
        .with_relationship("has properties");
    assert_eq!(ids(&report.search().advanced_search(&criteria)), vec![8]);

    let mismatch = criteria.with_relationship("CONTAINS");
    assert!(report.search().advanced_search(&mismatch).is_empty());
}

// ============================================================
// Lookup
// ============================================================

#[rstest]
fn given_known_and_unknown_ids_when_finding_then_returns_node_or_error(report: Report) {
    let engine = report.search();
    assert_eq!(engine.find_by_id(NodeId(4)).unwrap().id, NodeId(4));
    assert_eq!(engine.find_by_id("node_6".parse().unwrap()).unwrap().id, NodeId(6));
    assert_eq!(
        engine.find_by_id(NodeId(42)).unwrap_err(),
        DomainError::NodeNotFound(NodeId(42))
    );
}
