//! Metric parse benchmark suite
//!
//! Benchmarks for the per-line transform hot path.
//!
//! Run with: `cargo bench -p httplog-metric --bench parse`
//!
//! # What we measure
//!
//! - Tab splitting
//! - Counter increment with three labels
//! - Histogram observation with rescaling
//! - Upstream fan-out over a three-backend line

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use httplog_config::{LabelSpec, MathSpec, MetricKind, MetricSpec, UpstreamSpec};
use httplog_metric::{split_fields, Metric, ParseScratch};

const SIMPLE_LINE: &str = "example.com\tGET\t200\t0.045\t1024\t5432";

const UPSTREAM_LINE: &str = "web.example.org\tPOST\t502\t2.150\t2048\t512\t\
    10.0.1.10:8080, 10.0.1.11:8080, 10.0.1.12:8080\t0.005, 0.004, 0.003";

fn labels() -> Vec<LabelSpec> {
    ["host", "method", "status"]
        .iter()
        .enumerate()
        .map(|(line_index, name)| LabelSpec {
            name: (*name).into(),
            line_index,
            ..Default::default()
        })
        .collect()
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_fields");
    group.throughput(Throughput::Bytes(SIMPLE_LINE.len() as u64));
    group.bench_function("simple_line", |b| {
        b.iter(|| split_fields(black_box(SIMPLE_LINE)));
    });
    group.finish();
}

fn bench_counter(c: &mut Criterion) {
    let metric = Metric::new(&MetricSpec {
        name: "http_requests_total".into(),
        help: "The total number of client requests.".into(),
        labels: labels(),
        ..Default::default()
    })
    .unwrap();

    let fields = split_fields(SIMPLE_LINE);
    let mut scratch = ParseScratch::new();

    c.bench_function("counter_increment", |b| {
        b.iter(|| metric.parse(black_box(&fields), &mut scratch).unwrap());
    });
}

fn bench_histogram(c: &mut Criterion) {
    let metric = Metric::new(&MetricSpec {
        name: "http_request_duration_seconds".into(),
        kind: MetricKind::Histogram,
        help: "Request duration.".into(),
        value_index: Some(3),
        math: MathSpec {
            enabled: true,
            div: 1000.0,
            mul: 0.0,
        },
        labels: labels(),
        ..Default::default()
    })
    .unwrap();

    let fields = split_fields(SIMPLE_LINE);
    let mut scratch = ParseScratch::new();

    c.bench_function("histogram_observe", |b| {
        b.iter(|| metric.parse(black_box(&fields), &mut scratch).unwrap());
    });
}

fn bench_upstream(c: &mut Criterion) {
    let metric = Metric::new(&MetricSpec {
        name: "http_upstream_connect_duration_seconds_total".into(),
        help: "Upstream connect time.".into(),
        value_index: Some(7),
        math: MathSpec {
            enabled: true,
            div: 1000.0,
            mul: 0.0,
        },
        upstream: UpstreamSpec {
            enabled: true,
            addr_index: 6,
            label: true,
            excludes: Vec::new(),
        },
        labels: labels(),
        ..Default::default()
    })
    .unwrap();

    let fields = split_fields(UPSTREAM_LINE);
    let mut scratch = ParseScratch::new();

    c.bench_function("upstream_fan_out", |b| {
        b.iter(|| metric.parse(black_box(&fields), &mut scratch).unwrap());
    });
}

criterion_group!(
    benches,
    bench_split,
    bench_counter,
    bench_histogram,
    bench_upstream
);
criterion_main!(benches);
