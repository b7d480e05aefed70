//! Global configuration settings
//!
//! These settings apply across all components and provide sensible defaults.

use serde::Deserialize;

/// Default capacity of the payload hand-off queue
pub const DEFAULT_BUFFER_SIZE: usize = 1000;

/// Global configuration that applies to all components
///
/// All fields have sensible defaults - you only need to specify what you want to change.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Name of the active preset
    /// Default: "simple"
    pub preset: String,

    /// Number of line-handler workers
    /// Default: 0 (auto = number of CPU cores)
    pub worker_count: usize,

    /// Capacity of the payload hand-off queue between the syslog
    /// listener and the workers
    /// Default: 1000
    pub buffer_size: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            preset: "simple".into(),
            worker_count: 0,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl GlobalConfig {
    /// Get the effective number of workers
    ///
    /// Returns the configured value, or the number of CPUs when set
    /// to zero (auto mode).
    pub fn effective_worker_count(&self) -> usize {
        if self.worker_count == 0 {
            num_cpus()
        } else {
            self.worker_count
        }
    }

    /// Get the effective queue capacity
    ///
    /// A capacity of zero would mean an unbounded (or rendezvous) queue;
    /// neither is wanted, so zero falls back to the default.
    pub fn effective_buffer_size(&self) -> usize {
        if self.buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            self.buffer_size
        }
    }
}

/// Get the number of available CPUs, defaulting to 4 if detection fails
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert_eq!(config.preset, "simple");
        assert_eq!(config.worker_count, 0);
        assert_eq!(config.buffer_size, 1000);
    }

    #[test]
    fn test_effective_worker_count_auto() {
        let config = GlobalConfig::default();
        assert!(config.effective_worker_count() >= 1);
    }

    #[test]
    fn test_effective_worker_count_explicit() {
        let config = GlobalConfig {
            worker_count: 3,
            ..Default::default()
        };
        assert_eq!(config.effective_worker_count(), 3);
    }

    #[test]
    fn test_effective_buffer_size_zero_falls_back() {
        let config = GlobalConfig {
            buffer_size: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_buffer_size(), DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
preset = "nginx_full"
buffer_size = 5000
"#;
        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.preset, "nginx_full");
        assert_eq!(config.buffer_size, 5000);
        // Defaults still apply
        assert_eq!(config.worker_count, 0);
    }
}
