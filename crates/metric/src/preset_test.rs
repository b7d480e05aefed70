//! Tests for preset compilation

use httplog_config::{LabelSpec, MetricKind, MetricSpec};

use crate::preset::Preset;

fn spec(name: &str) -> MetricSpec {
    MetricSpec {
        name: name.into(),
        help: format!("{name} help"),
        labels: vec![LabelSpec {
            name: "host".into(),
            line_index: 0,
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn test_compile_preserves_order() {
    let config = httplog_config::Preset {
        metrics: vec![spec("http_requests_total"), spec("http_errors_total")],
    };

    let preset = Preset::compile("simple", &config).unwrap();

    assert_eq!(preset.name(), "simple");
    assert_eq!(preset.len(), 2);
    assert!(!preset.is_empty());
    assert_eq!(preset.metrics()[0].name(), "http_requests_total");
    assert_eq!(preset.metrics()[1].name(), "http_errors_total");
}

#[test]
fn test_compile_names_failing_metric() {
    let config = httplog_config::Preset {
        metrics: vec![
            spec("http_requests_total"),
            MetricSpec {
                name: "http_latency_seconds".into(),
                kind: MetricKind::Histogram,
                // Missing value_index
                ..Default::default()
            },
        ],
    };

    let err = Preset::compile("simple", &config).unwrap_err();
    assert_eq!(err.name, "http_latency_seconds");
    assert_eq!(
        err.to_string(),
        "could not create metric 'http_latency_seconds': value_index must be set for non-counter metrics"
    );
}

#[test]
fn test_compile_empty_preset() {
    let preset = Preset::compile("empty", &httplog_config::Preset::default()).unwrap();
    assert!(preset.is_empty());
    assert_eq!(preset.len(), 0);
}
