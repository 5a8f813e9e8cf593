//! Integration tests for tagscope
//!
//! These tests build a vault in a temporary directory, index it through the
//! filesystem source and run queries against the shared index.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use tagscope::{
    Document, DocumentSource, FsSource, Query, QueryEvaluator, SharedIndex, TagIndex,
    index::Indexer,
    materialize::{self, MatchBlock},
    patterns::{PatternConfig, PatternSettings},
    source::{MemorySource, refresh_document, sync_source, sync_source_with_threads},
};
use tempfile::TempDir;

const PROJECT: &str = "# Project\nsome note #alpha\n  nested line\n## Sub\nother line #beta=1";

/// Helper function to write a vault file, creating parent directories
fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Helper function to create a vault and index it
fn setup_vault(files: &[(&str, &str)]) -> (TempDir, FsSource, SharedIndex) {
    let dir = TempDir::new().unwrap();
    for (relative, content) in files {
        write(dir.path(), relative, content);
    }
    let source = FsSource::new(dir.path(), "**/*.md").unwrap();
    let index = SharedIndex::default();
    sync_source(&index, &source, 2).unwrap();
    (dir, source, index)
}

fn run(index: &SharedIndex, query: &str, current: Option<&str>) -> tagscope::ResultSet {
    let snapshot = index.read().unwrap();
    QueryEvaluator::new(&snapshot).evaluate(&Query::parse(query).unwrap(), current)
}

fn lines(lines: &[usize]) -> BTreeSet<usize> {
    lines.iter().copied().collect()
}

#[test]
fn test_vault_query_to_blocks() {
    let (_dir, _source, index) = setup_vault(&[("projects/p.md", PROJECT), ("misc.md", "#gamma")]);

    let results = run(&index, "#alpha | #beta", None);
    assert_eq!(results.get("projects/p.md"), Some(&lines(&[1, 2, 4])));
    assert!(!results.contains("misc.md"));

    let snapshot = index.read().unwrap();
    let matches = materialize::materialize(&results, &snapshot);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].title, "p");
    assert_eq!(
        matches[0].blocks,
        vec![
            MatchBlock { first_line: 1, text: "some note #alpha\n  nested line".to_string() },
            MatchBlock { first_line: 4, text: "other line #beta=1".to_string() },
        ]
    );
}

#[test]
fn test_and_stays_within_heading_scope() {
    let (_dir, _source, index) = setup_vault(&[
        ("flat.md", PROJECT),
        ("heading.md", "# Project #alpha\nnote\n## Sub\nother line #beta=1"),
    ]);

    let results = run(&index, "#alpha #beta", None);
    assert_eq!(results.documents().collect::<Vec<_>>(), vec!["heading.md"]);
    assert_eq!(results.get("heading.md"), Some(&lines(&[3])));
}

#[test]
fn test_valued_tags_and_nesting() {
    let (_dir, _source, index) = setup_vault(&[("p.md", PROJECT)]);

    assert_eq!(run(&index, "#beta=1", None).get("p.md"), Some(&lines(&[4])));
    assert_eq!(run(&index, "#beta", None).get("p.md"), Some(&lines(&[4])));
    assert!(run(&index, "#beta=2", None).is_empty());
}

#[test]
fn test_front_matter_tags_cover_block() {
    let (_dir, _source, index) =
        setup_vault(&[("fm.md", "---\nstatus: draft\n---\nbody #x")]);

    assert_eq!(run(&index, "#status=draft", None).get("fm.md"), Some(&lines(&[0, 1, 2])));
    assert_eq!(run(&index, "#frontmatter", None).get("fm.md"), Some(&lines(&[0, 1, 2])));
    assert!(run(&index, "#status #x", None).is_empty());
}

#[test]
fn test_negation_and_current_document() {
    let (_dir, _source, index) =
        setup_vault(&[("a.md", "#task #done\n#task\nplain"), ("b.md", "#task")]);

    let open = run(&index, "#task -#done doc:current", Some("a.md"));
    assert_eq!(open.documents().collect::<Vec<_>>(), vec!["a.md"]);
    assert_eq!(open.get("a.md"), Some(&lines(&[1])));

    let elsewhere = run(&index, "#task -doc:current", Some("a.md"));
    assert_eq!(elsewhere.documents().collect::<Vec<_>>(), vec!["b.md"]);
}

#[test]
fn test_resync_picks_up_changes() {
    let (dir, source, index) = setup_vault(&[("a.md", "#x"), ("b.md", "#x"), ("c.md", "#y")]);
    assert_eq!(run(&index, "#x", None).len(), 2);

    fs::remove_file(dir.path().join("b.md")).unwrap();
    write(dir.path(), "c.md", "#x");
    write(dir.path(), "new/d.md", "#x");

    let report = sync_source_with_threads(&index, &source, 2, 2).unwrap();
    assert_eq!(report.indexed, 3);
    assert_eq!(report.removed, 1);
    assert_eq!(
        run(&index, "#x", None).documents().collect::<Vec<_>>(),
        vec!["a.md", "c.md", "new/d.md"]
    );
    assert!(run(&index, "#y", None).is_empty());
}

#[test]
fn test_invalid_utf8_document_does_not_block_sync() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "good.md", "ok #alpha");
    fs::write(dir.path().join("bad.md"), [0x23, 0x78, 0xff, 0xfe, 0x0a]).unwrap();
    let source = FsSource::new(dir.path(), "**/*.md").unwrap();
    let index = SharedIndex::default();

    let report = sync_source(&index, &source, 10).unwrap();
    assert_eq!(report.indexed, 2);
    assert_eq!(run(&index, "#alpha", None).documents().collect::<Vec<_>>(), vec!["good.md"]);
}

#[test]
fn test_refresh_single_document() {
    let (dir, source, index) = setup_vault(&[("a.md", "#x")]);

    write(dir.path(), "a.md", "#y");
    assert!(refresh_document(&index, &source, "a.md").unwrap());
    assert!(run(&index, "#x", None).is_empty());
    assert_eq!(run(&index, "#y", None).len(), 1);

    fs::remove_file(dir.path().join("a.md")).unwrap();
    assert!(!refresh_document(&index, &source, "a.md").unwrap());
    assert!(index.read().unwrap().is_empty());
}

#[test]
fn test_tag_counts_over_vault() {
    let (_dir, _source, index) =
        setup_vault(&[("a.md", "#t\n  child\n#t #u"), ("b.md", "#t"), ("c.md", "#v")]);

    let snapshot = index.read().unwrap();
    let counts = snapshot.tag_counts_with_min("=", 2);
    assert_eq!(counts.into_iter().collect::<Vec<_>>(), vec![("t".to_string(), 3)]);
}

#[test]
fn test_custom_patterns() {
    let settings = PatternSettings { nesting: false, ..Default::default() };
    let indexer = Indexer::new(Arc::new(PatternConfig::new(&settings)));
    let index = SharedIndex::new(TagIndex::with_indexer(indexer));

    let source: MemorySource = [Document::new("a.md", "#project/alpha")].into_iter().collect();
    sync_source(&index, &source, 10).unwrap();

    assert_eq!(run(&index, "#project/alpha", None).len(), 1);
    assert!(run(&index, "#project", None).is_empty());
}

#[test]
fn test_json_and_text_queries_agree() {
    let (_dir, _source, index) = setup_vault(&[("p.md", PROJECT)]);

    let text = Query::parse("#alpha | range:beta..beta=9").unwrap();
    let json = Query::from_json(&text.to_json().unwrap()).unwrap();
    assert_eq!(text, json);

    let snapshot = index.read().unwrap();
    let evaluator = QueryEvaluator::new(&snapshot);
    assert_eq!(evaluator.evaluate(&text, None), evaluator.evaluate(&json, None));
}

#[test]
fn test_readers_see_whole_documents_during_sync() {
    let source: MemorySource =
        (0..50).map(|i| Document::new(format!("{i:02}.md"), "#a\n#b\n#a #b")).collect();
    let index = SharedIndex::default();

    let reader_index = index.clone();
    let reader = thread::spawn(move || {
        for _ in 0..100 {
            let snapshot = reader_index.read().unwrap();
            let results = QueryEvaluator::new(&snapshot)
                .evaluate(&Query::parse("#a #b").unwrap(), None);
            for (_, found) in &results {
                assert_eq!(found, &lines(&[2]));
            }
        }
    });

    sync_source_with_threads(&index, &source, 7, 2).unwrap();
    reader.join().unwrap();
    assert_eq!(index.read().unwrap().len(), 50);
    assert_eq!(source.fetch_all_documents(7).count(), 8);
}
