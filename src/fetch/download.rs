//! Concurrent, retrying download of every archive on a listing page.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::Url;
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info, warn};

use super::{HttpClient, fetch_bytes, list_archives};

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub suffix: String,
    pub concurrency: usize,
    pub retries: u32,
    /// Delay after the first failed attempt; grows linearly per attempt.
    pub backoff: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            suffix: "CWEC2016.zip".to_string(),
            concurrency: 10,
            retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

fn file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Fetches `url` into `target`, retrying up to `retries` attempts in total.
///
/// The body is written to a `.part` file first and renamed into place, so a
/// partial download is never left under the final name.
async fn download_one<C: HttpClient + ?Sized>(
    client: &C,
    url: &Url,
    target: &Path,
    retries: u32,
    backoff: Duration,
) -> Result<()> {
    let attempts = retries.max(1);

    for attempt in 1..=attempts {
        match fetch_bytes(client, url.as_str()).await {
            Ok(bytes) => {
                let part = target.with_extension("part");
                tokio::fs::write(&part, &bytes)
                    .await
                    .with_context(|| format!("failed to write {}", part.display()))?;
                tokio::fs::rename(&part, target).await?;
                return Ok(());
            }
            Err(e) if attempt < attempts => {
                warn!(attempt, attempts, error = %e, "Download attempt failed, retrying");
                tokio::time::sleep(backoff * attempt).await;
            }
            Err(e) => return Err(e.context(format!("giving up after {attempts} attempt(s)"))),
        }
    }

    unreachable!("the final attempt always returns")
}

/// Lists the archives at `base_url` and downloads the missing ones into
/// `dest` with at most `options.concurrency` transfers in flight.
///
/// Files that already exist are skipped. A file that still fails after its
/// last retry is logged and counted; it does not stop the other downloads.
///
/// # Errors
///
/// Fails only if `dest` cannot be created or the listing cannot be fetched.
#[tracing::instrument(skip(client, options), fields(dest = %dest.display(), concurrency = options.concurrency))]
pub async fn download_all<C: HttpClient + 'static>(
    client: Arc<C>,
    base_url: &str,
    dest: &Path,
    options: &DownloadOptions,
) -> Result<DownloadSummary> {
    tokio::fs::create_dir_all(dest)
        .await
        .with_context(|| format!("failed to create {}", dest.display()))?;

    let links = list_archives(client.as_ref(), base_url, &options.suffix).await?;
    info!(archives = links.len(), "Archive listing fetched");

    let mut summary = DownloadSummary::default();
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut tasks = Vec::new();
    let start = Instant::now();

    for url in links {
        let Some(name) = file_name(&url) else {
            continue;
        };
        let target: PathBuf = dest.join(&name);
        if target.exists() {
            summary.skipped += 1;
            continue;
        }

        let sem = semaphore.clone();
        let client = client.clone();
        let retries = options.retries;
        let backoff = options.backoff;
        let span = tracing::info_span!("download", file = %name);

        tasks.push(tokio::spawn(
            async move {
                let _permit = sem.acquire().await?;
                match download_one(client.as_ref(), &url, &target, retries, backoff).await {
                    Ok(()) => {
                        info!("Downloaded");
                        Ok::<(), anyhow::Error>(())
                    }
                    Err(e) => {
                        error!(url = %url, error = %format!("{e:#}"), "Download failed");
                        Err(e)
                    }
                }
            }
            .instrument(span),
        ));
    }

    if tasks.is_empty() {
        info!(skipped = summary.skipped, "All archives already present");
        return Ok(summary);
    }

    for task in tasks {
        match task.await {
            Ok(Ok(())) => summary.downloaded += 1,
            _ => summary.failed += 1,
        }
    }

    info!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        failed = summary.failed,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "Download summary"
    );
    Ok(summary)
}
