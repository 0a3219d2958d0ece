//! Filter pipeline benchmarks
//!
//! The pipeline runs on every frame and keystroke, so it is measured over
//! inbox-sized record sets.
//!
//! Run with: `cargo bench --bench filter_pipeline -p octotriage-core`

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use octotriage_core::{apply, parse, FilterPipeline};
use octotriage_domain::{Notification, StructuralFilter};

fn records(count: usize) -> Vec<Notification> {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);
    (0..count)
        .map(|i| {
            let id = i as i64;
            let mut n = Notification::new(id, now);
            let owner = ["rust-lang", "tokio-rs", "serde-rs", "octobox"][i % 4];
            n.repo.owner = Some(owner.to_string());
            n.repo.full_name = Some(format!("{owner}/repo-{}", i % 13));
            n.subject.title = Some(format!("Change number {i} touching the parser"));
            n.subject.subject_type = Some(if i % 3 == 0 { "Issue" } else { "PullRequest" }.into());
            n.subject.state = Some(["open", "merged", "closed"][i % 3].into());
            n.subject.author = Some(if i % 7 == 0 { "renovate[bot]" } else { "octocat" }.into());
            n.reason = Some(["mention", "review_requested", "subscribed"][i % 3].into());
            n.unread = i % 2 == 0;
            n.updated_at = Some(now - Duration::minutes(id));
            n
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_parse");
    let queries = [
        "",
        "parser",
        "repo:rust-lang/repo-1 is:unread type:pr",
        "-reason:subscribed owner:\"tokio-rs\",serde-rs fix",
    ];
    for raw in queries {
        group.bench_with_input(BenchmarkId::from_parameter(raw.len()), &raw, |b, raw| {
            b.iter(|| black_box(parse(black_box(raw))));
        });
    }
    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_apply");
    let query = parse("owner:rust-lang,tokio-rs is:unread -state:closed parser");
    let structural = StructuralFilter::Bot(false);

    for size in [100, 1_000, 10_000] {
        let rows = records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("query", size), &rows, |b, rows| {
            b.iter(|| black_box(apply(rows, None, Some(&query))));
        });
        group.bench_with_input(BenchmarkId::new("structural_and_query", size), &rows, |b, rows| {
            let pipeline = FilterPipeline::new(Some(&structural), Some(&query));
            b.iter(|| black_box(pipeline.apply(rows.iter())));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_apply);
criterion_main!(benches);
