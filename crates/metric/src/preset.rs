//! Compiled presets
//!
//! A preset compiles every metric specification of a configured preset in
//! declaration order. Parsing a line runs all of them; the order is part
//! of the contract (later metrics see the same line, and a scrape reflects
//! per-metric updates in declaration order within one worker).

use crate::error::PresetError;
use crate::metric::Metric;

/// Named, ordered set of compiled metrics sharing one log schema
#[derive(Debug)]
pub struct Preset {
    name: String,
    metrics: Vec<Metric>,
}

impl Preset {
    /// Compile a configured preset
    ///
    /// Fails on the first invalid metric, naming it.
    pub fn compile(name: &str, spec: &httplog_config::Preset) -> Result<Self, PresetError> {
        let mut metrics = Vec::with_capacity(spec.metrics.len());

        for metric_spec in &spec.metrics {
            let metric = Metric::new(metric_spec).map_err(|source| PresetError {
                name: metric_spec.name.clone(),
                source,
            })?;

            metrics.push(metric);
        }

        Ok(Self {
            name: name.to_string(),
            metrics,
        })
    }

    /// The preset's configured name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled metrics, in declaration order
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Number of metrics in the preset
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the preset is empty
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

#[cfg(test)]
#[path = "preset_test.rs"]
mod preset_test;
