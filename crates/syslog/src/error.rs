//! Syslog listener error types

use std::io;
use thiserror::Error;

/// Errors from the syslog listener
#[derive(Debug, Error)]
pub enum SyslogError {
    /// The listen address is malformed or uses an unsupported scheme
    #[error("invalid syslog listen address '{address}': {message}")]
    InvalidListenAddress {
        /// The offending address
        address: String,
        /// What is wrong with it
        message: String,
    },

    /// The datagram socket could not be bound
    #[error("could not bind syslog listener on '{address}': {source}")]
    Bind {
        /// The address that failed to bind
        address: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// The receive socket returned a non-recoverable error
    #[error("syslog listener stopped: {0}")]
    Terminal(#[source] io::Error),
}

impl SyslogError {
    /// Create an InvalidListenAddress error
    pub fn invalid_listen_address(
        address: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidListenAddress {
            address: address.into(),
            message: message.into(),
        }
    }
}
