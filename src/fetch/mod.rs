//! Acquisition of raw station archives over HTTP.
//!
//! [`HttpClient`] abstracts request execution so the listing and download
//! logic can run against a canned client in tests.

mod basic;
mod client;
pub mod download;
pub mod listing;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use download::{DownloadOptions, DownloadSummary, download_all};
pub use listing::{archive_links, list_archives};

use anyhow::Result;

/// Issues a GET for `url` and returns the body. Non-2xx statuses are errors.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
