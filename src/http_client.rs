use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const DEFAULT_TIMEOUT_SECS: u64 = 8;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Builds the shared client with a per-request timeout. Only the first call
/// wins; later calls (and `http_client`) reuse that client.
pub fn init_http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| build_client(timeout))
}

pub fn http_client() -> Result<&'static Client> {
    init_http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .context("failed to build http client")
}
