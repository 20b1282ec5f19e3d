// src/fetch/mod.rs
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Duration;

use crate::error::ScrapeError;

/// Realistic desktop browser identity. fbref serves a cut-down page (or a
/// block page) to clients that look like bots.
static USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn build_client() -> Result<Client, ScrapeError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .cookie_store(true)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Fetch one page and return its body. A fresh client is built for every
/// call and dropped before this returns; nothing is shared across
/// competitions. Non-success statuses are errors, and no retries are
/// performed here.
pub fn fetch_page(url: &str) -> Result<String, ScrapeError> {
    let client = build_client()?;
    let body = client.get(url).send()?.error_for_status()?.text()?;
    Ok(body)
}
