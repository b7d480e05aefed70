//! Preset and metric specification types
//!
//! A preset is a named, ordered collection of metric specifications that
//! share a single tab-delimited log schema. The specifications here are
//! plain data; compilation into live metrics (regex compilation, vector
//! creation, index checks) happens downstream.

use std::collections::HashMap;

use serde::Deserialize;

/// Named collection of metric specifications sharing one log schema
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Preset {
    /// Metric specifications, applied to every line in declaration order
    pub metrics: Vec<MetricSpec>,
}

/// Kind of aggregate a metric specification is backed by
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonically non-decreasing value
    #[default]
    Counter,
    /// Arbitrary value, last write wins
    Gauge,
    /// Bucketed distribution with sum and count
    Histogram,
}

impl MetricKind {
    /// Name of the kind as it appears in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
        }
    }
}

/// One declarative transform from a decoded log line to a labeled sample
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricSpec {
    /// Metric name in exposition-format syntax
    pub name: String,

    /// Backing aggregate kind
    #[serde(alias = "type")]
    pub kind: MetricKind,

    /// Human-readable description
    pub help: String,

    /// Static labels always attached to every sample
    pub const_labels: HashMap<String, String>,

    /// Zero-based field index carrying the numeric observation.
    /// Required for gauge and histogram; optional for counter
    /// (a counter without one increments by 1 per line).
    pub value_index: Option<usize>,

    /// Ascending histogram bucket upper bounds.
    /// Empty means the standard Prometheus buckets.
    pub buckets: Vec<f64>,

    /// Labels extracted from the line, in declaration order
    pub labels: Vec<LabelSpec>,

    /// Rewrites applied to the extracted value before numeric parsing
    pub replacements: Vec<ReplacementSpec>,

    /// Multi-valued upstream fan-out
    pub upstream: UpstreamSpec,

    /// Linear rescaling of the parsed value
    pub math: MathSpec,
}

/// One label extracted from a line field
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabelSpec {
    /// Label name
    pub name: String,

    /// Zero-based field index the label value comes from
    pub line_index: usize,

    /// Normalize the field through the user-agent classifier first
    pub user_agent: bool,

    /// Rewrites applied to the label value
    pub replacements: Vec<ReplacementSpec>,
}

/// One first-match rewrite rule
///
/// Exactly one of `string` and `regexp` must be set. A `string` matcher
/// replaces every occurrence of the substring; a `regexp` matcher replaces
/// every non-overlapping match and may reference capture groups from the
/// pattern in `replacement`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReplacementSpec {
    /// Exact substring matcher
    pub string: Option<String>,

    /// Regular expression matcher
    pub regexp: Option<String>,

    /// Replacement template
    pub replacement: String,
}

/// Linear rescaling applied to parsed values
///
/// When enabled, the value is divided by `div` (if non-zero) and then
/// multiplied by `mul` (if non-zero). A zero factor disables that step,
/// so `{enabled = true, div = 0, mul = 0}` is the identity.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MathSpec {
    /// Gate for the whole transform
    pub enabled: bool,

    /// Multiplication factor, applied second
    pub mul: f64,

    /// Division factor, applied first
    pub div: f64,
}

/// Multi-valued upstream fan-out
///
/// Models the nginx convention where `$upstream_addr` and friends are
/// comma-separated lists whose i-th entries align positionally.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamSpec {
    /// Enable the comma walk over the value field
    pub enabled: bool,

    /// Zero-based field index carrying the upstream addresses
    pub addr_index: usize,

    /// Attach the matched address as an `upstream` label
    pub label: bool,

    /// Addresses whose observations are dropped
    pub excludes: Vec<String>,
}
