//! Shared HTTP plumbing for motomap
//!
//! All external services go through one pooled client. Every request gets an
//! explicit timeout so a stalled service cannot block a build forever.

use std::time::Duration;

use log::debug;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::core::error::{Error, Result};

/// Global HTTP client
static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("motomap/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
});

pub fn client() -> &'static Client {
    &GLOBAL_CLIENT
}

/// Send a request and decode a JSON body, mapping non-success statuses to
/// [`Error::Http`]
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
    service: &str,
) -> Result<T> {
    let response = request.timeout(timeout).send().await?;
    let status = response.status();
    debug!("{service} responded with {status}");

    if !status.is_success() {
        return Err(Error::Http(format!("{service} returned status {status}")));
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
