//! Metric error types

use thiserror::Error;

/// Errors raised while compiling a metric specification
///
/// These are construction-time failures: the specification itself is
/// invalid and the metric can never be built from it. They abort startup.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Metric name is empty
    #[error("metric name cannot be empty")]
    EmptyName,

    /// A label has an empty name
    #[error("metric label name cannot be empty")]
    EmptyLabelName,

    /// Gauges and histograms need a field to read their value from
    #[error("value_index must be set for non-counter metrics")]
    MissingValueIndex,

    /// A replacement carries both a substring and a regexp matcher
    #[error("replacement cannot have both string and regexp matchers")]
    AmbiguousReplacement,

    /// A replacement carries neither matcher
    #[error("replacement must have either a string or a regexp matcher")]
    MissingMatcher,

    /// A replacement pattern does not compile
    #[error("invalid replacement pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compilation error from the regex engine
        #[source]
        source: regex::Error,
    },

    /// The backing vector rejected the specification
    /// (exposition-format naming rules, duplicate label names, ...)
    #[error("could not create vector for metric '{name}': {source}")]
    Vector {
        /// Metric name
        name: String,
        /// Underlying error
        #[source]
        source: prometheus::Error,
    },
}

/// Errors raised while compiling a whole preset
#[derive(Debug, Error)]
#[error("could not create metric '{name}': {source}")]
pub struct PresetError {
    /// Name of the metric that failed to compile
    pub name: String,
    /// The underlying specification error
    #[source]
    pub source: SpecError,
}

/// Errors raised while parsing one log line against one metric
///
/// Parse errors never mutate the backing aggregate; the line is counted
/// as a parse failure and processing continues with the next line.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The configured value index exceeds the line's arity
    #[error("line index out of range for value index {index}, line length is {length}")]
    ValueIndexOutOfRange {
        /// Configured value index
        index: usize,
        /// Number of fields in the line
        length: usize,
    },

    /// A label's line index exceeds the line's arity
    #[error("line index out of range for label {label}, line length is {length}")]
    LabelIndexOutOfRange {
        /// Label name
        label: String,
        /// Number of fields in the line
        length: usize,
    },

    /// The upstream address index exceeds the line's arity
    #[error("line index out of range for upstream address index {index}, line length is {length}")]
    UpstreamIndexOutOfRange {
        /// Configured address index
        index: usize,
        /// Number of fields in the line
        length: usize,
    },

    /// The value field does not decode as a float
    #[error("failed to parse value '{value}': {source}")]
    Value {
        /// The offending value
        value: String,
        /// Decode error
        #[source]
        source: std::num::ParseFloatError,
    },

    /// The value decoded but is NaN or infinite
    #[error("value {0} is not finite")]
    NonFinite(f64),

    /// A counter received a negative delta
    #[error("counter value cannot be negative: {0}")]
    NegativeCounter(f64),
}
