//! Deterministic resolver and encoder stand-ins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{CanonicalUrl, DomainResolver, EncodeError, EncodedImage, Hostname, QrEncoder};

/// Resolver that answers the same way for every host.
#[derive(Clone, Copy, Debug)]
pub struct StaticResolver(pub bool);

#[async_trait]
impl DomainResolver for StaticResolver {
    async fn resolves(&self, _host: &Hostname) -> bool {
        self.0
    }
}

/// Resolver that records how often it was asked and for which host.
#[derive(Debug, Default)]
pub struct CountingResolver {
    answer: bool,
    calls: AtomicUsize,
    last_host: Mutex<Option<String>>,
}

impl CountingResolver {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_host(&self) -> Option<String> {
        self.last_host.lock().ok().and_then(|g| g.clone())
    }
}

#[async_trait]
impl DomainResolver for CountingResolver {
    async fn resolves(&self, host: &Hostname) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut g) = self.last_host.lock() {
            *g = Some(host.as_str().to_string());
        }
        self.answer
    }
}

/// Encoder whose payload is the URL text itself, so tests can invert it.
#[derive(Clone, Copy, Debug)]
pub struct EchoEncoder;

#[async_trait]
impl QrEncoder for EchoEncoder {
    async fn encode(&self, url: &CanonicalUrl) -> Result<EncodedImage, EncodeError> {
        Ok(EncodedImage::from_bytes("text/plain", url.as_str().as_bytes()))
    }
}

/// Encoder that always fails.
#[derive(Clone, Copy, Debug)]
pub struct FailingEncoder;

#[async_trait]
impl QrEncoder for FailingEncoder {
    async fn encode(&self, _url: &CanonicalUrl) -> Result<EncodedImage, EncodeError> {
        Err(EncodeError::Render("stub encoder failure".into()))
    }
}
