//! Benchmarks for workspace index search.
//!
//! Populates a file-backed index at two sizes and measures the main search
//! shapes: prefix term match, tag filter, and backlink lookup.

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::print_stderr)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::time::Duration;
use tempfile::TempDir;

use cairn::models::{ExtractedLink, NoteMetadata, SearchQuery};
use cairn::{WorkspaceIndex, current_timestamp};

/// Sample titles for populating the index.
const SAMPLE_TITLES: &[&str] = &[
    "PostgreSQL connection pooling decision",
    "Redis cache eviction policy",
    "JWT token rotation schedule",
    "Sprint planning checklist",
    "Incident response runbook",
    "Quarterly roadmap review",
    "Onboarding guide for new engineers",
    "API versioning strategy",
    "Search relevance tuning notes",
    "Deployment rollback procedure",
];

/// Creates a file-backed index in the given directory.
fn create_index(temp_dir: &TempDir) -> WorkspaceIndex {
    let db_path = temp_dir.path().join("bench_index.sqlite3");
    WorkspaceIndex::open("bench", db_path).expect("Failed to open index")
}

/// Populates the index with the specified number of notes.
fn populate_index(index: &WorkspaceIndex, count: usize) {
    let now = current_timestamp();
    let types = ["project", "topic", "person"];

    for i in 0..count {
        let title = SAMPLE_TITLES[i % SAMPLE_TITLES.len()];
        let path = format!("notes/{i:05}");
        let next = (i + 1) % count;

        let metadata = NoteMetadata {
            title: format!("{title} {i}"),
            note_type: types[i % types.len()].to_string(),
            tags: vec!["benchmark".to_string()],
            aliases: Vec::new(),
            created: now.clone(),
            modified: now.clone(),
        };
        let links = vec![ExtractedLink {
            raw_text: format!("[[notes/{next:05}]]"),
            target: format!("notes/{next:05}"),
            display_text: format!("notes/{next:05}"),
            context: format!("links onward to note {next}"),
        }];

        if let Err(e) = index.note_updated(&path, &metadata, &links) {
            eprintln!("Warning: failed to index note {i}: {e}");
        }
    }
}

fn bench_search(c: &mut Criterion, count: usize, measurement_secs: u64) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let index = create_index(&temp_dir);
    populate_index(&index, count);

    let mut group = c.benchmark_group(format!("search_{count}_notes"));
    group.measurement_time(Duration::from_secs(measurement_secs));

    group.bench_function("prefix_query", |b| {
        let query = SearchQuery::new().with_query("postgre pool");
        b.iter(|| index.search(&query).expect("Search should succeed"));
    });

    group.bench_function("tag_filter", |b| {
        let query = SearchQuery::new().with_query("redis").with_tag("benchmark");
        b.iter(|| index.search(&query).expect("Search should succeed"));
    });

    group.bench_function("backlinks", |b| {
        let query = SearchQuery::new().with_backlinks_to("notes/00042");
        b.iter(|| index.search(&query).expect("Search should succeed"));
    });

    group.finish();
}

fn bench_search_100(c: &mut Criterion) {
    bench_search(c, 100, 10);
}

fn bench_search_1000(c: &mut Criterion) {
    bench_search(c, 1000, 15);
}

criterion_group!(benches, bench_search_100, bench_search_1000);
criterion_main!(benches);
