mod helpers;

use helpers::{names, TestProject};
use tome::category::CategoryPath;
use tome::error::TomeError;
use tome::search::{self, Provenance, SearchOutput, SearchQuery, SearchRequest};
use tome::store::{CommandProfile, KnowledgeStore, ProfileFilters};

fn sample_project() -> (TestProject, KnowledgeStore) {
    let project = TestProject::new();
    project.write_package("testing", "unit-testing", &["testing", "react", "jest"], &["test-basics"]);
    project.write_package("testing", "test-basics", &["testing", "fundamentals", "assertions"], &[]);
    project.write_package("security", "auth-patterns", &["auth", "oauth", "sessions"], &[]);
    project.write_package("standards/python", "python-style", &["style", "python", "lint"], &[]);
    project.write_package("standards/typescript", "ts-style", &["style", "typescript", "lint"], &[]);
    project.write_package("business", "pricing-rules", &["pricing", "billing", "plans"], &[]);
    project.write_package("business/tokenization", "token-billing", &["billing", "tokens", "usage"], &[]);
    project.build();

    let store = KnowledgeStore::load(project.config.store_path()).unwrap();
    (project, store)
}

fn query(tags: &[&str]) -> SearchQuery {
    SearchQuery {
        tags: names(tags),
        ..Default::default()
    }
}

#[test]
fn exact_tag_matches_rank_above_partial_matches() {
    let (_project, store) = sample_project();
    let hits = search::search(&store, &query(&["testing"]));

    let found: Vec<&str> = hits.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(found.len(), 2);
    assert!(found.contains(&"unit-testing"));
    assert!(found.contains(&"test-basics"));
    assert!(hits.iter().all(|h| h.relevance_score == Some(1.0)));

    let partial = search::search(&store, &query(&["test"]));
    assert!(partial.iter().all(|h| h.relevance_score == Some(0.5)));
    assert!(!partial.iter().any(|h| h.name == "auth-patterns"));
}

#[test]
fn text_filter_is_anded_with_tags() {
    let (_project, store) = sample_project();
    let q = SearchQuery {
        tags: names(&["testing"]),
        text: Some("BASICS".into()),
        ..Default::default()
    };
    let hits = search::search(&store, &q);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "test-basics");
}

#[test]
fn category_filter_is_exact_and_comma_separated() {
    let (_project, store) = sample_project();
    let q = SearchQuery {
        category: Some("business".into()),
        ..Default::default()
    };
    let hits = search::search(&store, &q);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "pricing-rules");

    let q = SearchQuery {
        category: Some("business, security".into()),
        ..Default::default()
    };
    assert_eq!(search::search(&store, &q).len(), 2);
}

#[test]
fn typescript_source_excludes_python_standards() {
    let (_project, store) = sample_project();
    let q = SearchQuery {
        tags: names(&["style"]),
        source_file_path: Some("src/app/main.ts".into()),
        ..Default::default()
    };
    let hits = search::search(&store, &q);
    let found: Vec<&str> = hits.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(found, vec!["ts-style"]);
}

#[test]
fn max_results_truncates_after_sorting() {
    let (_project, store) = sample_project();
    let q = SearchQuery {
        max_results: 3,
        ..Default::default()
    };
    assert_eq!(search::search(&store, &q).len(), 3);
}

#[test]
fn execute_expands_dependencies_once() {
    let (_project, store) = sample_project();
    let request = SearchRequest {
        query: query(&["react"]),
        command_profile: None,
        depth: 1,
    };
    let outcome = search::execute(&store, &request).unwrap();

    assert_eq!(outcome.hits.len(), 1);
    assert_eq!(outcome.hits[0].name, "unit-testing");
    assert_eq!(outcome.dependencies.len(), 1);
    assert_eq!(outcome.dependencies[0].name, "test-basics");
    assert_eq!(outcome.dependencies[0].source, Provenance::Dependency);

    let output = SearchOutput::new(&request, outcome).unwrap();
    assert_eq!(output.count, 1);
    assert_eq!(output.total_with_deps, 2);
    assert!(output.token_estimate > 0);
    assert!(output.suggestions.is_empty());
}

#[test]
fn empty_results_carry_suggestions() {
    let (_project, store) = sample_project();
    let request = SearchRequest {
        query: SearchQuery {
            tags: names(&["kubernetes"]),
            text: Some("helm".into()),
            ..Default::default()
        },
        command_profile: None,
        depth: 1,
    };
    let outcome = search::execute(&store, &request).unwrap();
    let output = SearchOutput::new(&request, outcome).unwrap();

    assert_eq!(output.count, 0);
    assert!(!output.suggestions.is_empty());
    assert!(output.suggestions.iter().any(|s| s.contains("--tags kubernetes")));
}

#[test]
fn profile_search_loads_always_first_and_excludes_categories() {
    let (_project, mut store) = sample_project();
    store.command_profiles.insert(
        "billing-review".into(),
        CommandProfile {
            always_load: names(&["auth-patterns"]),
            search_filters: ProfileFilters {
                tags: names(&["billing"]),
                category: None,
            },
            exclude_categories: vec![CategoryPath::from("business/tokenization")],
        },
    );

    let request = SearchRequest {
        query: SearchQuery::default(),
        command_profile: Some("billing-review".into()),
        depth: 0,
    };
    let outcome = search::execute(&store, &request).unwrap();
    let found: Vec<&str> = outcome.hits.iter().map(|h| h.name.as_str()).collect();

    assert_eq!(found, vec!["auth-patterns", "pricing-rules"]);
    assert_eq!(outcome.hits[0].source, Provenance::AlwaysLoad);
    assert_eq!(outcome.hits[1].source, Provenance::SearchFilters);
}

#[test]
fn profile_exclusion_covers_subcategories() {
    let (_project, mut store) = sample_project();
    store.command_profiles.insert(
        "no-business".into(),
        CommandProfile {
            search_filters: ProfileFilters {
                tags: names(&["billing"]),
                category: None,
            },
            exclude_categories: vec![CategoryPath::from("business")],
            ..Default::default()
        },
    );

    let request = SearchRequest {
        query: SearchQuery::default(),
        command_profile: Some("no-business".into()),
        depth: 0,
    };
    let outcome = search::execute(&store, &request).unwrap();
    assert!(outcome.hits.is_empty());
}

#[test]
fn unknown_profile_is_an_error() {
    let (_project, store) = sample_project();
    let request = SearchRequest {
        query: SearchQuery::default(),
        command_profile: Some("does-not-exist".into()),
        depth: 1,
    };
    let err = search::execute(&store, &request).unwrap_err();
    assert!(matches!(err, TomeError::UnknownProfile { .. }));
}
