//! httplog - Metric Engine
//!
//! The declarative transformer at the core of the exporter: it maps an
//! ordered tuple of tab-separated access-log fields onto labeled
//! Prometheus counters, gauges and histograms.
//!
//! # Architecture
//!
//! ```text
//! "host\tGET\t200\t1.234"        MetricSpec (config)
//!         │                           │
//!         ▼                           ▼ compile
//!   split_fields ──▶ ["host","GET","200","1.234"] ──▶ Metric::parse
//!                                                        │
//!                              replacements / user-agent / math / upstream
//!                                                        │
//!                                                        ▼
//!                                     CounterVec / GaugeVec / HistogramVec
//! ```
//!
//! # Key Design
//!
//! - **Compile once, parse forever**: specifications are validated and
//!   compiled at startup; `parse` is immutable and thread-safe.
//! - **Tagged aggregate**: the metric kind dispatches through an enum,
//!   not runtime type introspection.
//! - **Pooled scratch**: each worker owns a [`ParseScratch`] so the label
//!   tuple never allocates per line once warm.
//! - **Errors never write**: a parse error leaves every aggregate exactly
//!   as it was.

mod error;
mod fields;
mod metric;
mod preset;
mod replace;

pub use error::{ParseError, PresetError, SpecError};
pub use fields::split_fields;
pub use metric::{Metric, ParseScratch, UPSTREAM_LABEL};
pub use preset::Preset;
pub use replace::{apply_first, Replacement};
