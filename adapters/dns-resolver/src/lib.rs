//! dns-resolver — system name-resolution adapter for the `DomainResolver` port.
//!
//! Purpose
//! - Confirm that a hostname resolves with a single lookup through the
//!   operating system resolver (`getaddrinfo` via `tokio::net::lookup_host`).
//! - Collapse every failure (unknown host, network error, timeout, empty
//!   answer) into `false`.
//!
//! Notes
//! - The lookup is bounded by a timeout (default 3s). No caching, no retries.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use domain::{DomainResolver, Hostname};
use tracing::debug;

/// Bound applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolver backed by the host's system resolver.
#[derive(Clone, Copy, Debug)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl DomainResolver for SystemResolver {
    async fn resolves(&self, host: &Hostname) -> bool {
        let found = bounded(tokio::net::lookup_host((host.as_str(), 0)), self.timeout).await;
        if !found {
            debug!(%host, "domain did not resolve");
        }
        found
    }
}

/// Await `lookup` for at most `timeout`; true iff it yields an address.
async fn bounded<F, I>(lookup: F, timeout: Duration) -> bool
where
    F: Future<Output = io::Result<I>>,
    I: Iterator<Item = SocketAddr>,
{
    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(mut addrs)) => {
            let found = addrs.next().is_some();
            if !found {
                debug!("lookup returned no addresses");
            }
            found
        }
        Ok(Err(e)) => {
            debug!(err = %e, "lookup failed");
            false
        }
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "lookup timed out");
            false
        }
    }
}
