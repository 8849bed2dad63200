//! Integration test: real server on loopback, length query and parallel download.

mod common;

use parget_core::client::{self, ClientError, DownloadOptions};
use parget_core::config::ClientSettings;
use parget_core::protocol::{self, Message, MessageKind};
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn three_mib_file_in_three_chunks_over_two_connections() {
    let src_dir = tempdir().unwrap();
    let dst_dir = tempdir().unwrap();
    let body = common::server::body(3 * 1_048_576);
    let source = common::server::write_source(src_dir.path(), "src.bin", &body);
    let addr = common::server::start().await;

    let remote = source.to_str().unwrap();
    let len = client::get_length(&addr, remote).await.expect("get_length");
    assert_eq!(len, 3 * 1_048_576);

    let settings = ClientSettings {
        chunk_size: 1_048_576,
        connections: 2,
    };
    let local = dst_dir.path().join("dst.bin");
    let opts = DownloadOptions::new(&addr, remote, &local, &settings);

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel(16);
    let progress = tokio::spawn(async move {
        let mut last = None;
        let mut updates = 0;
        while let Some(stats) = progress_rx.recv().await {
            updates += 1;
            last = Some(stats);
        }
        (updates, last)
    });

    let report = client::download(&opts, len as u64, Some(progress_tx))
        .await
        .expect("download");

    assert_eq!(report.chunks_scheduled, 3);
    assert_eq!(report.chunks_written, 3);
    assert_eq!(report.workers_failed, 0);
    assert!(report.is_complete());

    let content = std::fs::read(&local).unwrap();
    assert_eq!(content.len(), body.len(), "file size must match");
    assert!(content == body, "file content must match");

    let (updates, last) = progress.await.unwrap();
    assert_eq!(updates, 3);
    let last = last.unwrap();
    assert_eq!(last.bytes_done, 3 * 1_048_576);
    assert_eq!(last.fraction(), 1.0);
}

#[tokio::test]
async fn odd_size_with_many_small_chunks() {
    let src_dir = tempdir().unwrap();
    let dst_dir = tempdir().unwrap();
    let body = common::server::body(100_003);
    let source = common::server::write_source(src_dir.path(), "odd.bin", &body);
    let addr = common::server::start().await;

    let settings = ClientSettings {
        chunk_size: 4096,
        connections: 5,
    };
    let local = dst_dir.path().join("odd.bin");
    let opts = DownloadOptions::new(&addr, source.to_str().unwrap(), &local, &settings);
    let report = client::download(&opts, body.len() as u64, None).await.unwrap();

    assert_eq!(report.chunks_scheduled, 25);
    assert!(report.is_complete());
    assert_eq!(std::fs::read(&local).unwrap(), body);
}

#[tokio::test]
async fn zero_length_file_reports_zero() {
    let src_dir = tempdir().unwrap();
    let source = common::server::write_source(src_dir.path(), "empty.bin", b"");
    let addr = common::server::start().await;

    let len = client::get_length(&addr, source.to_str().unwrap()).await.unwrap();
    assert_eq!(len, 0);
}

#[tokio::test]
async fn length_query_surfaces_server_error() {
    let src_dir = tempdir().unwrap();
    let missing = src_dir.path().join("does-not-exist.bin");
    let addr = common::server::start().await;

    match client::get_length(&addr, missing.to_str().unwrap()).await {
        Err(ClientError::Server(text)) => assert!(text.contains("does-not-exist.bin"), "{text}"),
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn length_query_without_server_fails_to_connect() {
    let addr = common::server::dead_addr();
    assert!(matches!(
        client::get_length(&addr, "x").await,
        Err(ClientError::Connect { .. })
    ));
}

#[tokio::test]
async fn workers_that_cannot_connect_end_the_run_without_hanging() {
    let dst_dir = tempdir().unwrap();
    let addr = common::server::dead_addr();
    let settings = ClientSettings {
        chunk_size: 10,
        connections: 3,
    };
    let local = dst_dir.path().join("out.bin");
    let opts = DownloadOptions::new(&addr, "remote.bin", &local, &settings);

    let report = client::download(&opts, 1000, None).await.unwrap();

    assert_eq!(report.workers_failed, 3);
    assert_eq!(report.chunks_written, 0);
    assert!(report.chunks_scheduled < 100);
    assert_eq!(report.missing_bytes(), 1000);
    assert_eq!(std::fs::metadata(&local).unwrap().len(), 1000);
}

#[tokio::test]
async fn file_shrinking_below_reported_size_leaves_hole() {
    let src_dir = tempdir().unwrap();
    let dst_dir = tempdir().unwrap();
    let body = common::server::body(8192);
    // Client believes the file is 12 KiB; the last 4 KiB chunk fails on the server.
    let source = common::server::write_source(src_dir.path(), "short.bin", &body);
    let addr = common::server::start().await;

    let settings = ClientSettings {
        chunk_size: 4096,
        connections: 2,
    };
    let local = dst_dir.path().join("short.bin");
    let opts = DownloadOptions::new(&addr, source.to_str().unwrap(), &local, &settings);
    let report = client::download(&opts, 12_288, None).await.unwrap();

    assert_eq!(report.chunks_scheduled, 3);
    assert_eq!(report.chunks_written, 2);
    assert_eq!(report.missing_bytes(), 4096);
    let out = std::fs::read(&local).unwrap();
    assert_eq!(out.len(), 12_288);
    assert_eq!(&out[..8192], &body[..]);
    assert!(out[8192..].iter().all(|&b| b == 0));
}

#[tokio::test]
async fn one_tcp_connection_serves_many_requests() {
    let src_dir = tempdir().unwrap();
    let a = common::server::write_source(src_dir.path(), "a.bin", b"alpha-alpha");
    let b = common::server::write_source(src_dir.path(), "b.bin", b"bravo");
    let (a, b) = (a.to_str().unwrap(), b.to_str().unwrap());
    let addr = common::server::start().await;

    let mut conn = TcpStream::connect(&addr).await.unwrap();

    assert_eq!(call(&mut conn, Message::get_len(a)).await.length, 11);
    assert_eq!(call(&mut conn, Message::get(a, 6, 5)).await.payload, b"alpha");

    let past_end = call(&mut conn, Message::get(a, 6, 50)).await;
    assert_eq!(past_end.kind, MessageKind::Err);

    assert_eq!(call(&mut conn, Message::get_len(b)).await.length, 5);
    assert_eq!(call(&mut conn, Message::get(b, 0, 5)).await.payload, b"bravo");

    let unknown = call(&mut conn, Message::with_kind(MessageKind::Unknown(7), b)).await;
    assert_eq!(unknown.kind, MessageKind::Err);
    assert_eq!(call(&mut conn, Message::get(b, 1, 2)).await.payload, b"ra");
}

#[tokio::test]
async fn oversized_frame_header_closes_only_that_connection() {
    let src_dir = tempdir().unwrap();
    let a = common::server::write_source(src_dir.path(), "a.bin", b"alpha");
    let a = a.to_str().unwrap();
    let addr = common::server::start().await;

    let mut bogus = TcpStream::connect(&addr).await.unwrap();
    let mut header = vec![protocol::MAGIC, protocol::VERSION];
    header.extend_from_slice(&(1u64 << 45).to_be_bytes());
    bogus.write_all(&header).await.unwrap();
    bogus.shutdown().await.unwrap();
    let mut rest = Vec::new();
    bogus.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());

    let mut conn = TcpStream::connect(&addr).await.unwrap();
    assert_eq!(call(&mut conn, Message::get_len(a)).await.length, 5);
}

async fn call(conn: &mut TcpStream, request: Message) -> Message {
    protocol::encode(conn, &request).await.unwrap();
    protocol::decode(conn).await.unwrap()
}
