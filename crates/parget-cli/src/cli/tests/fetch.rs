//! Tests for the `pgcl` download command against live sockets.

use crate::cli::commands::{progress_line, run_fetch};
use parget_core::client::DownloadOptions;
use parget_core::config::{ClientSettings, ServerSettings};
use parget_core::progress::ProgressStats;
use parget_core::protocol::{self, Message, MessageKind};
use parget_core::server::Server;
use std::path::Path;
use tokio::net::TcpListener;

async fn start_server() -> String {
    let settings = ServerSettings {
        listen_addr: "127.0.0.1:0".to_string(),
        ..ServerSettings::default()
    };
    let server = Server::bind(&settings).await.unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(server.run());
    addr
}

/// Answers the first request on one connection with `reply`.
async fn start_fixed_reply(reply: Message) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (mut conn, _) = listener.accept().await.unwrap();
        let request = protocol::decode(&mut conn).await.unwrap();
        assert_eq!(request.kind, MessageKind::GetLen);
        protocol::encode(&mut conn, &reply).await.unwrap();
    });
    addr
}

fn options(server: &str, remote: &str, local: &Path) -> DownloadOptions {
    DownloadOptions::new(server, remote, local, &ClientSettings::default())
}

#[tokio::test]
async fn fetch_zero_length_file_fails_without_creating_output() {
    let dir = tempfile::tempdir().unwrap();
    let remote = dir.path().join("empty.bin");
    std::fs::write(&remote, b"").unwrap();
    let local = dir.path().join("out.bin");
    let server = start_server().await;

    let err = run_fetch(&options(&server, remote.to_str().unwrap(), &local))
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("server reported file size 0"));
    assert!(!local.exists());
}

#[tokio::test]
async fn fetch_negative_length_fails_without_creating_output() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("out.bin");
    let server = start_fixed_reply(Message::len(-5)).await;

    let err = run_fetch(&options(&server, "whatever.bin", &local))
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("negative file size -5"));
    assert!(!local.exists());
}

#[tokio::test]
async fn fetch_length_error_names_the_failed_step() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("out.bin");
    let server = start_fixed_reply(Message::err("no such file")).await;

    let err = run_fetch(&options(&server, "missing.bin", &local))
        .await
        .unwrap_err();

    let text = format!("{:#}", err);
    assert!(text.contains("failed to get length of file"));
    assert!(text.contains("no such file"));
    assert!(!local.exists());
}

#[tokio::test]
async fn fetch_copies_file() {
    let dir = tempfile::tempdir().unwrap();
    let remote = dir.path().join("src.bin");
    let body: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&remote, &body).unwrap();
    let local = dir.path().join("out.bin");
    let server = start_server().await;

    let settings = ClientSettings {
        chunk_size: 4096,
        connections: 2,
    };
    let opts = DownloadOptions::new(&server, remote.to_str().unwrap(), &local, &settings);
    run_fetch(&opts).await.unwrap();

    assert_eq!(std::fs::read(&local).unwrap(), body);
}

#[test]
fn progress_line_shows_rate_eta_and_chunks() {
    let stats = ProgressStats {
        bytes_done: 1 << 20,
        total_bytes: 4 << 20,
        elapsed_secs: 2.0,
        chunks_done: 1,
        chunk_count: 4,
    };
    assert_eq!(
        progress_line(&stats),
        "1048576/4194304 (25.0%) 0.50 MiB/s ETA 6s [1/4]"
    );
}

#[test]
fn progress_line_without_rate_has_unknown_eta() {
    let stats = ProgressStats {
        bytes_done: 0,
        total_bytes: 100,
        elapsed_secs: 0.0,
        chunks_done: 0,
        chunk_count: 1,
    };
    assert_eq!(progress_line(&stats), "0/100 (0.0%) 0.00 MiB/s ETA ? [0/1]");
}
