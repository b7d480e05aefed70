//! Tests for the syslog listener

use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::error::SyslogError;
use crate::listener::{extract_payload, ListenAddr, SyslogListener};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

#[test]
fn test_listen_addr_parse_udp() {
    let addr = ListenAddr::parse("udp://127.0.0.1:5514").unwrap();
    assert_eq!(addr, ListenAddr::Udp("127.0.0.1:5514".into()));
    assert_eq!(addr.to_string(), "udp://127.0.0.1:5514");
}

#[test]
fn test_listen_addr_parse_unix() {
    let addr = ListenAddr::parse("unix:///run/httplog.sock").unwrap();
    assert_eq!(addr, ListenAddr::Unix("/run/httplog.sock".into()));
    assert_eq!(addr.to_string(), "unix:///run/httplog.sock");
}

#[test]
fn test_listen_addr_parse_rejects_bad_schemes() {
    for address in [
        "",
        "://address",
        "invalid://address",
        "tcp://127.0.0.1:1234",
        "udp://",
        "unix://",
        "127.0.0.1:5514",
    ] {
        let err = ListenAddr::parse(address).unwrap_err();
        assert!(
            matches!(err, SyslogError::InvalidListenAddress { .. }),
            "address {address:?}"
        );
    }
}

#[test]
fn test_extract_payload_rfc3164() {
    let packet = b"<190>Aug 15 20:16:01 nginx: localhost:8080\tGET\t404\t0.000\t767\t710";
    assert_eq!(
        extract_payload(packet),
        Some(&b"localhost:8080\tGET\t404\t0.000\t767\t710"[..])
    );
}

#[test]
fn test_extract_payload_without_space_after_tag() {
    let packet = b"<190>Aug 15 20:16:01 nginx:payload";
    assert_eq!(extract_payload(packet), Some(&b"payload"[..]));
}

#[test]
fn test_extract_payload_trims_trailing_control_bytes() {
    let packet = b"<190>Aug 15 20:16:01 nginx: payload\r\n\0";
    assert_eq!(extract_payload(packet), Some(&b"payload"[..]));
}

#[test]
fn test_extract_payload_keeps_colons_in_payload() {
    // The host:port colon in field 0 is payload, not framing.
    let packet = b"<190>Aug 15 20:16:01 nginx: localhost:8080\tGET";
    assert_eq!(extract_payload(packet), Some(&b"localhost:8080\tGET"[..]));
}

#[test]
fn test_extract_payload_discards_header_only_record() {
    // Two colons (the timestamp), never a third: not an access-log record.
    assert_eq!(extract_payload(b"<34>Oct 11 22:14:15"), None);
}

#[test]
fn test_extract_payload_discards_non_syslog() {
    assert_eq!(extract_payload(b""), None);
    assert_eq!(extract_payload(b"plain text: a: b: c"), None);
    assert_eq!(extract_payload(b"{\"json\": 1}"), None);
}

#[tokio::test]
async fn test_udp_listener_delivers_payload() {
    let (tx, rx) = crossfire::mpmc::bounded_async(16);
    let listener = SyslogListener::bind("udp://127.0.0.1:0", tx).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let metrics = listener.metrics();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(listener.run(cancel.clone()));

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client
        .send_to(
            b"<190>Aug 15 20:16:01 nginx: localhost:8080\tGET\t404\t0.000\t767\t710",
            addr,
        )
        .await
        .unwrap();

    let payload = timeout(RECV_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(payload, "localhost:8080\tGET\t404\t0.000\t767\t710");
    assert_eq!(metrics.snapshot().packets_received, 1);

    cancel.cancel();
    timeout(RECV_TIMEOUT, handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_udp_listener_discards_invalid_datagrams() {
    let (tx, rx) = crossfire::mpmc::bounded_async(16);
    let listener = SyslogListener::bind("udp://127.0.0.1:0", tx).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let metrics = listener.metrics();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(listener.run(cancel.clone()));

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    // No third colon: dropped without reaching the queue.
    client.send_to(b"<34>Oct 11 22:14:15", addr).await.unwrap();
    // Not a syslog record at all.
    client.send_to(b"plain text", addr).await.unwrap();
    // A valid record to prove the loop kept running.
    client
        .send_to(b"<190>Aug 15 20:16:01 nginx: ok\tGET\t200", addr)
        .await
        .unwrap();

    let payload = timeout(RECV_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(payload, "ok\tGET\t200");

    // Datagrams from one socket are handled in order, so by now both
    // invalid packets have been counted.
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.packets_received, 1);
    assert_eq!(snapshot.packets_discarded, 2);

    cancel.cancel();
    timeout(RECV_TIMEOUT, handle).await.unwrap().unwrap().unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_unix_listener_delivers_payload_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("httplog.sock");
    let address = format!("unix://{}", path.display());

    let (tx, rx) = crossfire::mpmc::bounded_async(16);
    let listener = SyslogListener::bind(&address, tx).await.unwrap();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(listener.run(cancel.clone()));

    let client = std::os::unix::net::UnixDatagram::unbound().unwrap();
    client
        .send_to(
            b"<190>Aug 15 20:16:01 nginx: localhost:8080\tGET\t404\t0.000\t767\t710",
            &path,
        )
        .unwrap();

    let payload = timeout(RECV_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(payload, "localhost:8080\tGET\t404\t0.000\t767\t710");

    cancel.cancel();
    timeout(RECV_TIMEOUT, handle).await.unwrap().unwrap().unwrap();

    // The socket path is removed on shutdown.
    assert!(!path.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_bind_fails_on_existing_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("existing.sock");
    std::fs::write(&path, b"").unwrap();

    let (tx, _rx) = crossfire::mpmc::bounded_async::<String>(1);
    let err = SyslogListener::bind(&format!("unix://{}", path.display()), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, SyslogError::Bind { .. }));
}

#[tokio::test]
async fn test_listener_stops_when_queue_closes() {
    let (tx, rx) = crossfire::mpmc::bounded_async::<String>(1);
    let listener = SyslogListener::bind("udp://127.0.0.1:0", tx).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(listener.run(CancellationToken::new()));

    // Close the consuming side, then wake the listener with a packet.
    drop(rx);
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client
        .send_to(b"<190>Aug 15 20:16:01 nginx: a\tb", addr)
        .await
        .unwrap();

    // The failed publish reads as an orderly shutdown.
    timeout(RECV_TIMEOUT, handle).await.unwrap().unwrap().unwrap();
}
