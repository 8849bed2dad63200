//! `pgcl` – download one file.

use anyhow::{Context, Result};
use parget_core::client::{self, DownloadOptions};
use parget_core::progress::ProgressStats;
use std::io::Write;

pub async fn run_fetch(opts: &DownloadOptions) -> Result<()> {
    let len = client::get_length(&opts.server_addr, &opts.remote_path)
        .await
        .context("failed to get length of file")?;
    if len == 0 {
        anyhow::bail!("server reported file size 0");
    }
    let total = u64::try_from(len)
        .map_err(|_| anyhow::anyhow!("server reported negative file size {}", len))?;

    println!("downloading {} of size {}", opts.remote_path, total);
    println!(
        "chunk size: {} concurrent downloads: {}",
        opts.chunk_size, opts.connections
    );

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    let progress_handle = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(stats) = progress_rx.recv().await {
            let _ = write!(stdout, "\r{}", progress_line(&stats));
            let _ = stdout.flush();
        }
        println!();
    });

    let report = client::download(opts, total, Some(progress_tx)).await?;
    let _ = progress_handle.await;

    if !report.is_complete() {
        tracing::warn!(
            missing = report.missing_bytes(),
            written = report.chunks_written,
            scheduled = report.chunks_scheduled,
            dropped = report.chunks_dropped,
            failed_writes = report.chunks_failed,
            workers_failed = report.workers_failed,
            "download incomplete, failed chunks are not retried"
        );
        eprintln!(
            "warning: {} of {} bytes were not downloaded ({} chunks dropped, {} writes failed); {} is incomplete",
            report.missing_bytes(),
            report.total_size,
            report.chunks_dropped,
            report.chunks_failed,
            opts.local_path.display()
        );
    }
    Ok(())
}

/// One progress line: `written/total (pct%) rate MiB/s ETA s [chunks]`.
pub(crate) fn progress_line(stats: &ProgressStats) -> String {
    let eta = match stats.eta_secs() {
        Some(secs) => format!("{:.0}s", secs),
        None => "?".to_string(),
    };
    format!(
        "{}/{} ({:.1}%) {:.2} MiB/s ETA {} [{}/{}]",
        stats.bytes_done,
        stats.total_bytes,
        stats.fraction() * 100.0,
        stats.bytes_per_sec() / (1024.0 * 1024.0),
        eta,
        stats.chunks_done,
        stats.chunk_count
    )
}
