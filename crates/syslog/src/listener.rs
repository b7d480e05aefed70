//! Datagram syslog listener
//!
//! Receives one syslog record per datagram over UDP or a unix datagram
//! socket, strips the RFC3164 header, and publishes the remaining payload
//! on the bounded hand-off queue.
//!
//! # Header stripping
//!
//! RFC3164 frames look like `<PRI>TIMESTAMP HOST TAG: payload`. The
//! timestamp carries two colons (`HH:MM:SS`) and the tag ends with one, so
//! everything up to and including the third colon (plus one optional
//! space) is framing and everything after it is the access-log line.
//! Datagrams without three colons, without a leading `<`, or empty are
//! silently discarded.
//!
//! # Backpressure
//!
//! Publishing blocks when the queue is full. The kernel keeps buffering
//! incoming datagrams until its receive buffer overflows, at which point
//! the OS drops packets - the usual UDP contract.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossfire::MAsyncTx;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
#[cfg(unix)]
use tokio::net::UnixDatagram;
use tokio_util::sync::CancellationToken;

use crate::error::SyslogError;
use crate::pool::PacketBufferPool;

/// Largest datagram the listener accepts (matches common syslog limits)
pub const MAX_DATAGRAM_SIZE: usize = 8192;

/// Number of pre-allocated packet buffers
const POOL_SIZE: usize = 64;

/// Kernel receive buffer requested for the UDP socket
const UDP_RECV_BUFFER_SIZE: usize = 1024 * 1024;

/// Pause before retrying after a transient receive error
const TRANSIENT_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Parsed listen address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenAddr {
    /// `udp://host:port`
    Udp(String),
    /// `unix://path`
    Unix(PathBuf),
}

impl ListenAddr {
    /// Parse a `udp://host:port` or `unix://path` listen address
    pub fn parse(address: &str) -> Result<Self, SyslogError> {
        if let Some(host) = address.strip_prefix("udp://") {
            if host.is_empty() {
                return Err(SyslogError::invalid_listen_address(address, "missing host"));
            }

            return Ok(Self::Udp(host.to_string()));
        }

        if let Some(path) = address.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(SyslogError::invalid_listen_address(address, "missing path"));
            }

            return Ok(Self::Unix(PathBuf::from(path)));
        }

        Err(SyslogError::invalid_listen_address(
            address,
            "must start with udp:// or unix://",
        ))
    }
}

impl std::fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Udp(host) => write!(f, "udp://{}", host),
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

/// Listener activity counters
#[derive(Debug, Default)]
pub struct ListenerMetrics {
    /// Datagrams whose payload reached the queue
    pub packets_received: AtomicU64,

    /// Payload bytes published
    pub bytes_received: AtomicU64,

    /// Datagrams discarded (empty, no syslog framing, no third colon)
    pub packets_discarded: AtomicU64,

    /// Transient receive errors
    pub recv_errors: AtomicU64,
}

/// Point-in-time snapshot of listener counters
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenerSnapshot {
    pub packets_received: u64,
    pub bytes_received: u64,
    pub packets_discarded: u64,
    pub recv_errors: u64,
}

impl ListenerMetrics {
    /// Snapshot the counters
    pub fn snapshot(&self) -> ListenerSnapshot {
        ListenerSnapshot {
            packets_received: self.packets_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            packets_discarded: self.packets_discarded.load(Ordering::Relaxed),
            recv_errors: self.recv_errors.load(Ordering::Relaxed),
        }
    }
}

/// The bound datagram socket
#[derive(Debug)]
enum DatagramSocket {
    Udp(UdpSocket),
    #[cfg(unix)]
    Unix(UnixDatagram),
}

impl DatagramSocket {
    async fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Udp(socket) => socket.recv_from(buf).await.map(|(len, _)| len),
            #[cfg(unix)]
            Self::Unix(socket) => socket.recv_from(buf).await.map(|(len, _)| len),
        }
    }
}

/// Datagram syslog listener
///
/// Bound and ready after [`bind`](Self::bind); [`run`](Self::run) drives
/// the receive loop until cancelled or a terminal socket error occurs.
#[derive(Debug)]
pub struct SyslogListener {
    socket: DatagramSocket,
    addr: ListenAddr,
    pool: PacketBufferPool,
    payload_tx: MAsyncTx<String>,
    metrics: Arc<ListenerMetrics>,
}

impl SyslogListener {
    /// Bind the listener on a `udp://` or `unix://` address
    ///
    /// # Errors
    ///
    /// [`SyslogError::InvalidListenAddress`] for a malformed address,
    /// [`SyslogError::Bind`] when the socket cannot be bound.
    pub async fn bind(
        listen_address: &str,
        payload_tx: MAsyncTx<String>,
    ) -> Result<Self, SyslogError> {
        let addr = ListenAddr::parse(listen_address)?;

        let bind_error = |source| SyslogError::Bind {
            address: listen_address.to_string(),
            source,
        };

        let socket = match &addr {
            ListenAddr::Udp(host) => {
                DatagramSocket::Udp(bind_udp(host).map_err(bind_error)?)
            }
            #[cfg(unix)]
            ListenAddr::Unix(path) => {
                DatagramSocket::Unix(UnixDatagram::bind(path).map_err(bind_error)?)
            }
            #[cfg(not(unix))]
            ListenAddr::Unix(_) => {
                return Err(SyslogError::invalid_listen_address(
                    listen_address,
                    "unix sockets are not supported on this platform",
                ));
            }
        };

        Ok(Self {
            socket,
            addr,
            pool: PacketBufferPool::new(POOL_SIZE, MAX_DATAGRAM_SIZE),
            payload_tx,
            metrics: Arc::new(ListenerMetrics::default()),
        })
    }

    /// The parsed listen address
    pub fn addr(&self) -> &ListenAddr {
        &self.addr
    }

    /// Local address of the UDP socket (None for unix sockets)
    ///
    /// Useful when binding to port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.socket {
            DatagramSocket::Udp(socket) => socket.local_addr().ok(),
            #[cfg(unix)]
            DatagramSocket::Unix(_) => None,
        }
    }

    /// Handle to the listener counters
    pub fn metrics(&self) -> Arc<ListenerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run the receive loop
    ///
    /// Returns `Ok(())` on cancellation or when the payload queue closes;
    /// returns [`SyslogError::Terminal`] when the socket fails
    /// non-transiently. The unix socket path, if any, is removed on every
    /// exit path.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), SyslogError> {
        tracing::info!(address = %self.addr, "syslog listener started");

        let result = self.recv_loop(&cancel).await;

        self.cleanup();
        tracing::info!(address = %self.addr, "syslog listener stopped");

        result
    }

    async fn recv_loop(&self, cancel: &CancellationToken) -> Result<(), SyslogError> {
        loop {
            let mut buf = self.pool.get();

            let received = tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    self.pool.put(buf);
                    return Ok(());
                }

                received = self.socket.recv(&mut buf) => received,
            };

            match received {
                Ok(len) => {
                    let keep_going = self.handle_packet(&buf[..len]).await;
                    self.pool.put(buf);

                    if !keep_going {
                        // Queue closed under us: orderly shutdown.
                        return Ok(());
                    }
                }
                Err(err) if is_transient(&err) => {
                    self.metrics.recv_errors.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(error = %err, "transient syslog recv error");
                    self.pool.put(buf);
                    tokio::time::sleep(TRANSIENT_RETRY_DELAY).await;
                }
                Err(err) => {
                    self.pool.put(buf);
                    return Err(SyslogError::Terminal(err));
                }
            }
        }
    }

    /// Strip the header and publish the payload
    ///
    /// Returns false when the queue has closed.
    async fn handle_packet(&self, packet: &[u8]) -> bool {
        let Some(payload) = extract_payload(packet) else {
            self.metrics.packets_discarded.fetch_add(1, Ordering::Relaxed);
            return true;
        };

        let payload = String::from_utf8_lossy(payload).into_owned();

        self.metrics.packets_received.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .bytes_received
            .fetch_add(payload.len() as u64, Ordering::Relaxed);

        // Blocks when the queue is full: backpressure to the socket.
        self.payload_tx.send(payload).await.is_ok()
    }

    /// Remove the unix socket path; harmless to call more than once
    fn cleanup(&self) {
        if let ListenAddr::Unix(path) = &self.addr {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Bind a UDP socket with an enlarged kernel receive buffer
fn bind_udp(host: &str) -> std::io::Result<UdpSocket> {
    use std::net::ToSocketAddrs;

    let addr = host
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no address"))?;

    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;

    if let Err(err) = socket.set_recv_buffer_size(UDP_RECV_BUFFER_SIZE) {
        tracing::warn!(
            error = %err,
            requested_size = UDP_RECV_BUFFER_SIZE,
            "failed to set UDP SO_RCVBUF"
        );
    }

    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}

/// Errors worth retrying after a short pause
fn is_transient(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock
            | std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::Interrupted
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionRefused
    )
}

/// Extract the access-log payload from a raw syslog datagram
///
/// Returns None for datagrams that should be discarded: empty, not
/// starting with `<`, or carrying fewer than three colons. Trailing
/// control bytes (newlines, NULs) are trimmed first; one space after the
/// third colon is swallowed.
pub fn extract_payload(packet: &[u8]) -> Option<&[u8]> {
    if packet.is_empty() || packet[0] != b'<' {
        return None;
    }

    // Trim trailing control characters and NULs
    let mut end = packet.len();
    while end > 0 && packet[end - 1] < 0x20 {
        end -= 1;
    }
    let packet = &packet[..end];

    let mut colons = 0;

    for (index, &byte) in packet.iter().enumerate() {
        if byte != b':' {
            continue;
        }

        colons += 1;
        if colons < 3 {
            continue;
        }

        let mut start = index + 1;
        if start < packet.len() && packet[start] == b' ' {
            start += 1;
        }

        return Some(&packet[start..]);
    }

    None
}

#[cfg(test)]
#[path = "listener_test.rs"]
mod listener_test;
