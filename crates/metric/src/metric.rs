//! One declarative transform from a decoded line to a labeled aggregate
//!
//! A [`Metric`] is the compiled form of a configuration specification: the
//! backing Prometheus vector, the compiled rewrite rules, and the label
//! layout. `parse` applies the transform to one tab-split line and updates
//! the aggregate; it never mutates state when it returns an error.
//!
//! # Thread safety
//!
//! `parse` is safe to call concurrently from any number of workers. The
//! backing vectors are internally synchronized; the only per-call mutable
//! state lives in the caller-owned [`ParseScratch`].

use std::borrow::Cow;

use httplog_config::{MathSpec, MetricKind, MetricSpec};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts};

use crate::error::{ParseError, SpecError};
use crate::replace::{apply_first, Replacement};

/// Name of the implicit label slot added by upstream fan-out
pub const UPSTREAM_LABEL: &str = "upstream";

/// The backing aggregate, dispatched at compile time by kind
#[derive(Debug)]
enum Aggregate {
    Counter(CounterVec),
    Gauge(GaugeVec),
    Histogram(HistogramVec),
}

/// One compiled label extraction
#[derive(Debug)]
struct Label {
    name: String,
    line_index: usize,
    user_agent: bool,
    replacements: Vec<Replacement>,
}

/// Compiled upstream fan-out settings (present only when enabled)
#[derive(Debug)]
struct Upstream {
    addr_index: usize,
    label: bool,
    excludes: Vec<String>,
}

/// Reusable per-worker scratch for the label-value tuple
///
/// Parsing a line needs one string slot per declared label; pooling the
/// slots per worker keeps the hot path free of per-line allocations once
/// the buffers have grown to their working size.
#[derive(Default)]
pub struct ParseScratch {
    values: Vec<String>,
}

impl ParseScratch {
    /// Create an empty scratch
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the first `arity` slots, growing the pool if needed
    fn begin(&mut self, arity: usize) {
        if self.values.len() < arity {
            self.values.resize_with(arity, String::new);
        }

        for value in &mut self.values[..arity] {
            value.clear();
        }
    }

    /// Overwrite one slot, reusing its buffer
    fn set(&mut self, slot: usize, value: &str) {
        let target = &mut self.values[slot];
        target.clear();
        target.push_str(value);
    }

    /// View of the first `arity` slots
    fn values(&self, arity: usize) -> &[String] {
        &self.values[..arity]
    }
}

/// A compiled metric specification and its backing aggregate
#[derive(Debug)]
pub struct Metric {
    name: String,
    aggregate: Aggregate,
    value_index: Option<usize>,
    replacements: Vec<Replacement>,
    labels: Vec<Label>,
    upstream: Option<Upstream>,
    math: MathSpec,
    /// Label slots per sample: declared labels plus the upstream slot
    arity: usize,
}

impl Metric {
    /// Compile a metric specification
    ///
    /// # Errors
    ///
    /// Returns [`SpecError`] when the specification is structurally
    /// invalid: empty metric or label names, a gauge or histogram without
    /// a value index, a replacement with zero or two matchers, a pattern
    /// that does not compile, or a name the exposition format rejects.
    pub fn new(spec: &MetricSpec) -> Result<Self, SpecError> {
        if spec.name.is_empty() {
            return Err(SpecError::EmptyName);
        }

        if spec.value_index.is_none() && spec.kind != MetricKind::Counter {
            return Err(SpecError::MissingValueIndex);
        }

        let upstream_labeled = spec.upstream.enabled && spec.upstream.label;

        let mut label_keys = Vec::with_capacity(spec.labels.len() + usize::from(upstream_labeled));
        let mut labels = Vec::with_capacity(spec.labels.len());

        for label_spec in &spec.labels {
            if label_spec.name.is_empty() {
                return Err(SpecError::EmptyLabelName);
            }

            label_keys.push(label_spec.name.as_str());
            labels.push(Label {
                name: label_spec.name.clone(),
                line_index: label_spec.line_index,
                user_agent: label_spec.user_agent,
                replacements: Replacement::compile_all(&label_spec.replacements)?,
            });
        }

        if upstream_labeled {
            label_keys.push(UPSTREAM_LABEL);
        }

        let arity = label_keys.len();

        // The exposition format forbids an empty HELP-less family in some
        // encoders; fall back to the metric name rather than reject.
        let help = if spec.help.is_empty() {
            spec.name.clone()
        } else {
            spec.help.clone()
        };

        let vector_error = |source| SpecError::Vector {
            name: spec.name.clone(),
            source,
        };

        let aggregate = match spec.kind {
            MetricKind::Counter => {
                let opts = Opts::new(spec.name.clone(), help)
                    .const_labels(spec.const_labels.clone());

                Aggregate::Counter(CounterVec::new(opts, &label_keys).map_err(vector_error)?)
            }
            MetricKind::Gauge => {
                let opts = Opts::new(spec.name.clone(), help)
                    .const_labels(spec.const_labels.clone());

                Aggregate::Gauge(GaugeVec::new(opts, &label_keys).map_err(vector_error)?)
            }
            MetricKind::Histogram => {
                let buckets = if spec.buckets.is_empty() {
                    prometheus::DEFAULT_BUCKETS.to_vec()
                } else {
                    spec.buckets.clone()
                };

                let opts = HistogramOpts::new(spec.name.clone(), help)
                    .const_labels(spec.const_labels.clone())
                    .buckets(buckets);

                Aggregate::Histogram(HistogramVec::new(opts, &label_keys).map_err(vector_error)?)
            }
        };

        let upstream = if spec.upstream.enabled {
            Some(Upstream {
                addr_index: spec.upstream.addr_index,
                label: spec.upstream.label,
                excludes: spec.upstream.excludes.clone(),
            })
        } else {
            None
        };

        Ok(Self {
            name: spec.name.clone(),
            aggregate,
            value_index: spec.value_index,
            replacements: Replacement::compile_all(&spec.replacements)?,
            labels,
            upstream,
            math: spec.math,
            arity,
        })
    }

    /// The configured metric name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the transform to one decoded line
    ///
    /// Thread-safe; callers supply their own scratch. Returns `Ok(())`
    /// both on a successful update and on the "no observation" sentinels
    /// (blank line, empty value field, `"-"`). An error means this line
    /// produced no update for this metric.
    pub fn parse(&self, fields: &[&str], scratch: &mut ParseScratch) -> Result<(), ParseError> {
        if fields.is_empty() || fields[0].is_empty() {
            return Ok(());
        }

        // Extract the raw value first so an out-of-range value index is
        // reported even when a label would also be out of range.
        let mut raw_value: Option<Cow<'_, str>> = None;

        if let Some(index) = self.value_index {
            let field = fields
                .get(index)
                .copied()
                .ok_or(ParseError::ValueIndexOutOfRange {
                    index,
                    length: fields.len(),
                })?;

            if field.is_empty() || field == "-" {
                return Ok(());
            }

            raw_value = Some(apply_first(&self.replacements, field));
        }

        scratch.begin(self.arity);

        for (slot, label) in self.labels.iter().enumerate() {
            let field =
                fields
                    .get(label.line_index)
                    .copied()
                    .ok_or_else(|| ParseError::LabelIndexOutOfRange {
                        label: label.name.clone(),
                        length: fields.len(),
                    })?;

            let value = if label.user_agent {
                httplog_useragent::family(field)
            } else {
                field
            };

            let value = apply_first(&label.replacements, value);
            scratch.set(slot, &value);
        }

        let Some(raw_value) = raw_value else {
            // No value index: a counter that increments once per line.
            self.increment(scratch.values(self.arity));
            return Ok(());
        };

        // A replacement may have rewritten the value to nothing.
        if raw_value.is_empty() {
            return Ok(());
        }

        if let Some(upstream) = &self.upstream {
            return self.fan_out(fields, &raw_value, upstream, scratch);
        }

        self.observe(&raw_value, scratch.values(self.arity))
    }

    /// Increment the counter by one for this label tuple
    fn increment(&self, values: &[String]) {
        // Construction guarantees a counter when no value index is set.
        if let Aggregate::Counter(vec) = &self.aggregate {
            vec.with_label_values(&label_refs(values)).inc();
        }
    }

    /// Walk a comma-separated value list, one observation per backend
    ///
    /// Position `i` of the value list aligns with position `i` of the
    /// address list; when the values outnumber the addresses the last
    /// address is reused, and surplus addresses are ignored. `"-"`
    /// entries are skipped but still advance the position.
    fn fan_out(
        &self,
        fields: &[&str],
        raw_value: &str,
        upstream: &Upstream,
        scratch: &mut ParseScratch,
    ) -> Result<(), ParseError> {
        // Addresses are only needed to exclude backends or label samples.
        let need_addresses = upstream.label || !upstream.excludes.is_empty();

        let addresses: Vec<&str> = if need_addresses {
            let field =
                fields
                    .get(upstream.addr_index)
                    .copied()
                    .ok_or(ParseError::UpstreamIndexOutOfRange {
                        index: upstream.addr_index,
                        length: fields.len(),
                    })?;

            field.split(',').map(str::trim).collect()
        } else {
            Vec::new()
        };

        for (position, element) in raw_value.split(',').enumerate() {
            let element = element.trim();

            if element == "-" {
                continue;
            }

            if !addresses.is_empty() {
                let address = addresses[position.min(addresses.len() - 1)];

                if upstream.excludes.iter().any(|excluded| excluded == address) {
                    continue;
                }

                if upstream.label {
                    scratch.set(self.arity - 1, address);
                }
            }

            self.observe(element, scratch.values(self.arity))?;
        }

        Ok(())
    }

    /// Parse one value string and update the aggregate
    fn observe(&self, raw: &str, values: &[String]) -> Result<(), ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let parsed: f64 = trimmed.parse().map_err(|source| ParseError::Value {
            value: trimmed.to_string(),
            source,
        })?;

        if !parsed.is_finite() {
            return Err(ParseError::NonFinite(parsed));
        }

        let value = self.rescale(parsed);
        let refs = label_refs(values);

        match &self.aggregate {
            Aggregate::Counter(vec) => {
                if value < 0.0 {
                    return Err(ParseError::NegativeCounter(value));
                }

                vec.with_label_values(&refs).inc_by(value);
            }
            Aggregate::Gauge(vec) => vec.with_label_values(&refs).set(value),
            Aggregate::Histogram(vec) => vec.with_label_values(&refs).observe(value),
        }

        Ok(())
    }

    /// Apply the configured linear rescaling
    ///
    /// Division first, then multiplication; a zero factor disables that
    /// step, so `{enabled, div: 0, mul: 0}` is the identity.
    fn rescale(&self, value: f64) -> f64 {
        if !self.math.enabled {
            return value;
        }

        let mut value = value;

        if self.math.div != 0.0 {
            value /= self.math.div;
        }

        if self.math.mul != 0.0 {
            value *= self.math.mul;
        }

        value
    }
}

impl Collector for Metric {
    fn desc(&self) -> Vec<&Desc> {
        match &self.aggregate {
            Aggregate::Counter(vec) => vec.desc(),
            Aggregate::Gauge(vec) => vec.desc(),
            Aggregate::Histogram(vec) => vec.desc(),
        }
    }

    fn collect(&self) -> Vec<MetricFamily> {
        match &self.aggregate {
            Aggregate::Counter(vec) => vec.collect(),
            Aggregate::Gauge(vec) => vec.collect(),
            Aggregate::Histogram(vec) => vec.collect(),
        }
    }
}

/// Borrow the label tuple as the slice the vector API wants
fn label_refs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

#[cfg(test)]
#[path = "metric_test.rs"]
mod metric_test;
