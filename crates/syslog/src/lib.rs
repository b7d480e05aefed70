//! httplog - Syslog Ingestion
//!
//! Datagram-oriented syslog receiver for access logs.
//!
//! # Architecture
//!
//! ```text
//! nginx ──syslog/UDP──▶ SyslogListener ──▶ bounded queue ──▶ workers
//!                        │
//!                        ├─ PacketBufferPool (reused 8KB buffers)
//!                        └─ RFC3164 header strip (third-colon rule)
//! ```
//!
//! # Design
//!
//! - **One datagram, one record**: no stream reassembly, matching how
//!   nginx and Apache emit access logs over syslog.
//! - **Pooled buffers**: the receive path reuses fixed-size buffers from
//!   a lock-free pool.
//! - **Blocking publish**: a full queue applies backpressure; the kernel
//!   socket buffer absorbs bursts and drops beyond that.
//! - **Graceful shutdown**: cancellation stops the loop; the unix socket
//!   path is removed on the way out.

mod error;
mod listener;
mod pool;

pub use error::SyslogError;
pub use listener::{
    extract_payload, ListenAddr, ListenerMetrics, ListenerSnapshot, SyslogListener,
    MAX_DATAGRAM_SIZE,
};
pub use pool::{PacketBufferPool, PoolSnapshot};
