//! Collector error types

use thiserror::Error;

/// Errors raised while constructing the collector
///
/// All of these are startup failures; once the collector runs, bad input
/// only ever increments the parse-error counter.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The configuration does not carry the active preset
    #[error(transparent)]
    Config(#[from] httplog_config::ConfigError),

    /// A metric specification in the active preset is invalid
    #[error(transparent)]
    Preset(#[from] httplog_metric::PresetError),

    /// The syslog listener could not be created
    #[error(transparent)]
    Syslog(#[from] httplog_syslog::SyslogError),

    /// A built-in metric could not be created
    #[error("could not create built-in metric: {0}")]
    BuiltIn(#[from] prometheus::Error),
}
