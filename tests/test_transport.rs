mod common;

use common::{MockTransport, ScratchDir, SendStep};
use std::time::Duration;
use tinyhttpd::error::TransportError;
use tinyhttpd::server::transport::{send_file, RecvEvent, TcpConnection, Transport, TX_BUFFER_SIZE};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

async fn connected_pair() -> (TcpConnection, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let (stream, remote) = listener.accept().await.unwrap();
    let local = stream.local_addr().unwrap();
    (TcpConnection::new(stream, local, remote), client)
}

#[tokio::test]
async fn test_send_file_empty_file_sends_nothing() {
    let dir = ScratchDir::new("tx-empty");
    let path = dir.write("empty.bin", b"");
    let mut transport = MockTransport::default();

    let sent = send_file(&mut transport, &path).await.unwrap();

    assert_eq!(sent, 0);
    assert_eq!(transport.send_calls, 0);
}

#[tokio::test]
async fn test_send_file_loops_over_partial_writes() {
    let dir = ScratchDir::new("tx-partial");
    let path = dir.write("ten.txt", b"0123456789");
    let mut transport = MockTransport::default().plan([
        SendStep::Accept(3),
        SendStep::Accept(3),
        SendStep::Accept(3),
    ]);

    let sent = send_file(&mut transport, &path).await.unwrap();

    assert_eq!(sent, 10);
    assert_eq!(transport.sent, b"0123456789");
    assert_eq!(transport.send_calls, 4);
}

#[tokio::test]
async fn test_send_file_one_byte_at_a_time() {
    let dir = ScratchDir::new("tx-trickle");
    let content = b"never truncated";
    let path = dir.write("slow.txt", content);
    let mut transport = MockTransport::default().plan(vec![SendStep::Accept(1); content.len()]);

    let sent = send_file(&mut transport, &path).await.unwrap();

    assert_eq!(sent, content.len() as u64);
    assert_eq!(transport.sent, content);
}

#[tokio::test(start_paused = true)]
async fn test_send_file_backs_off_and_retries_on_zero_send() {
    let dir = ScratchDir::new("tx-congested");
    let path = dir.write("data.txt", b"abcdefgh");
    let mut transport = MockTransport::default().plan([
        SendStep::Accept(4),
        SendStep::Congested,
        SendStep::Congested,
    ]);

    let start = tokio::time::Instant::now();
    let sent = send_file(&mut transport, &path).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(sent, 8);
    assert_eq!(transport.sent, b"abcdefgh");
    assert_eq!(transport.send_calls, 4);
    assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn test_send_file_aborts_on_send_failure() {
    let dir = ScratchDir::new("tx-fail");
    let path = dir.write("data.txt", b"abcdefgh");
    let mut transport = MockTransport::default().plan([SendStep::Accept(2), SendStep::Fail]);

    let result = send_file(&mut transport, &path).await;

    assert!(matches!(result, Err(TransportError::Io(_))));
    assert_eq!(transport.sent, b"ab");
    assert_eq!(transport.send_calls, 2);
}

#[tokio::test]
async fn test_send_file_missing_file_fails_before_sending() {
    let dir = ScratchDir::new("tx-missing");
    let mut transport = MockTransport::default();

    let result = send_file(&mut transport, &dir.path().join("absent.bin")).await;

    assert!(matches!(result, Err(TransportError::FileOpen { .. })));
    assert_eq!(transport.send_calls, 0);
}

#[tokio::test]
async fn test_send_file_spans_several_chunks() {
    let dir = ScratchDir::new("tx-chunks");
    let content: Vec<u8> = (0..TX_BUFFER_SIZE + 4096).map(|i| (i % 251) as u8).collect();
    let path = dir.write("big.bin", &content);
    let mut transport = MockTransport::default().plan([SendStep::Accept(1000), SendStep::Accept(7)]);

    let sent = send_file(&mut transport, &path).await.unwrap();

    assert_eq!(sent, content.len() as u64);
    assert_eq!(transport.sent, content);
}

#[tokio::test]
async fn test_tcp_wait_times_out_without_data() {
    let (mut conn, _client) = connected_pair().await;

    assert_eq!(conn.wait_for_readable(Duration::from_millis(50)).await, RecvEvent::TimedOut);
    assert_eq!(conn.wait_for_readable(Duration::ZERO).await, RecvEvent::TimedOut);
}

#[tokio::test]
async fn test_tcp_wait_then_recv_data() {
    let (mut conn, mut client) = connected_pair().await;
    client.write_all(b"abc").await.unwrap();

    assert_eq!(conn.wait_for_readable(Duration::from_secs(5)).await, RecvEvent::Readable);

    let mut buf = [0u8; 8];
    let mut got = Vec::new();
    while got.len() < 3 {
        let n = conn.recv(&mut buf).await.unwrap();
        got.extend_from_slice(&buf[..n]);
    }
    assert_eq!(got, b"abc");

    // Everything was consumed: the next wait must time out again.
    assert_eq!(conn.wait_for_readable(Duration::from_millis(50)).await, RecvEvent::TimedOut);
}

#[tokio::test]
async fn test_tcp_peer_close_is_readable_then_zero() {
    let (mut conn, client) = connected_pair().await;
    drop(client);

    assert_eq!(conn.wait_for_readable(Duration::from_secs(5)).await, RecvEvent::Readable);
    let mut buf = [0u8; 4];
    assert_eq!(conn.recv(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn test_tcp_send_reaches_peer() {
    let (mut conn, mut client) = connected_pair().await;

    let mut sent = 0;
    while sent < 5 {
        sent += conn.send(&b"hello"[sent..]).await.unwrap();
    }

    let mut buf = [0u8; 5];
    tokio::io::AsyncReadExt::read_exact(&mut client, &mut buf).await.unwrap();
    assert_eq!(&buf, b"hello");
}

#[tokio::test]
async fn test_tcp_shutdown_invalidates_transport() {
    let (mut conn, _client) = connected_pair().await;
    assert!(conn.is_valid());

    conn.shutdown().await.unwrap();

    assert!(!conn.is_valid());
    assert!(matches!(conn.send(b"x").await, Err(TransportError::NotConnected)));
    assert!(matches!(conn.recv(&mut [0u8; 1]).await, Err(TransportError::NotConnected)));
    assert_eq!(conn.wait_for_readable(Duration::ZERO).await, RecvEvent::Error);
    assert!(matches!(conn.shutdown().await, Err(TransportError::NotConnected)));
}

#[tokio::test]
async fn test_tcp_endpoints_are_recorded() {
    let (conn, client) = connected_pair().await;

    assert_eq!(conn.peer_addr(), client.local_addr().unwrap());
    assert_eq!(conn.local_addr(), client.peer_addr().unwrap());
}
