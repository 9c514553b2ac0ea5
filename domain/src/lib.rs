//! Domain library for the link-to-QR service.
//!
//! This crate holds the domain types, ports (traits), the pure normalization
//! and validation rules, and the `QrService` that sequences them. It performs
//! no network or image I/O itself; resolution and encoding arrive through the
//! `DomainResolver` and `QrEncoder` ports. Keep adapters and IO concerns out
//! of this crate.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Top-level domains accepted by the validator.
pub const ALLOWED_TLDS: [&str; 11] = [
    "com", "net", "org", "in", "io", "app", "tech", "dev", "edu", "gov", "info",
];

/// Returns true when `label` (compared lower-cased) is in [`ALLOWED_TLDS`].
pub fn is_allowed_tld(label: &str) -> bool {
    let lower = label.to_ascii_lowercase();
    ALLOWED_TLDS.contains(&lower.as_str())
}

/// An absolute URL string that always carries an `http://` or `https://` scheme.
///
/// Only [`normalize::normalize`] constructs one, so the value a caller sees as
/// "their link" is exactly what gets encoded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub(crate) fn from_normalized(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the hostname using standard URL parsing.
    pub fn hostname(&self) -> Result<Hostname, InvalidReason> {
        let parsed = url::Url::parse(&self.0).map_err(|_| InvalidReason::MalformedFormat)?;
        let host = parsed.host_str().ok_or(InvalidReason::MalformedFormat)?;
        Hostname::new(host)
    }
}

impl Display for CanonicalUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Domain-name component of a [`CanonicalUrl`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Hostname(String);

impl Hostname {
    pub fn new<S: Into<String>>(s: S) -> Result<Self, InvalidReason> {
        let val = s.into();
        // At least one label plus a dot-separated suffix
        let has_suffix = val
            .split_once('.')
            .is_some_and(|(label, suffix)| !label.is_empty() && !suffix.is_empty());
        if !has_suffix {
            return Err(InvalidReason::MalformedFormat);
        }
        Ok(Self(val))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Hostname {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a raw input was rejected by the validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    Empty,
    MalformedFormat,
    DisallowedTld,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::Empty => "empty",
            InvalidReason::MalformedFormat => "malformed_format",
            InvalidReason::DisallowedTld => "disallowed_tld",
        }
    }
}

impl Display for InvalidReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating a raw input. Rejection is an expected result, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(CanonicalUrl),
    Invalid(InvalidReason),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn into_result(self) -> Result<CanonicalUrl, InvalidReason> {
        match self {
            ValidationResult::Valid(url) => Ok(url),
            ValidationResult::Invalid(reason) => Err(reason),
        }
    }
}

/// A binary image payload carried as base64 text with its MIME type.
///
/// Created per request and never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    mime_type: String,
    base64: String,
}

impl EncodedImage {
    pub fn from_bytes<S: Into<String>>(mime_type: S, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: STANDARD.encode(bytes),
        }
    }

    pub fn png(bytes: &[u8]) -> Self {
        Self::from_bytes("image/png", bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// Embedded data representation: `data:<mime>;base64,<payload>`.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }

    /// Decode the base64 payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.base64)
    }
}

/// Port for confirming that a hostname resolves.
///
/// Any failure (unknown host, network error, timeout) collapses into `false`.
#[async_trait]
pub trait DomainResolver: Send + Sync {
    async fn resolves(&self, host: &Hostname) -> bool;
}

/// Port for turning a confirmed URL into a scannable image.
#[async_trait]
pub trait QrEncoder: Send + Sync {
    async fn encode(&self, url: &CanonicalUrl) -> Result<EncodedImage, EncodeError>;
}

#[async_trait]
impl<T: DomainResolver + ?Sized> DomainResolver for Arc<T> {
    async fn resolves(&self, host: &Hostname) -> bool {
        (**self).resolves(host).await
    }
}

#[async_trait]
impl<T: QrEncoder + ?Sized> QrEncoder for Arc<T> {
    async fn encode(&self, url: &CanonicalUrl) -> Result<EncodedImage, EncodeError> {
        (**self).encode(url).await
    }
}

/// Failures raised by an encoder implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("payload exceeds symbol capacity")]
    DataTooLong,
    #[error("render failed: {0}")]
    Render(String),
}

/// Terminal failures of a generate request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("url field missing or not text")]
    MissingUrl,
    #[error("input is empty")]
    EmptyInput,
    #[error("url is malformed")]
    MalformedFormat,
    #[error("top-level domain is not allowed")]
    DisallowedTld,
    #[error("domain does not resolve")]
    DomainUnresolvable,
    #[error("encoding failed: {0}")]
    EncodingFailure(String),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("unreadable request body: {0}")]
    UnreadableBody(String),
}

impl PipelineError {
    /// Everything except an encoding failure is the caller's fault.
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, PipelineError::EncodingFailure(_))
    }

    /// Stable message safe to return to callers; never includes internal causes.
    pub fn public_message(&self) -> &'static str {
        match self {
            PipelineError::MissingUrl => "Invalid URL",
            PipelineError::EmptyInput
            | PipelineError::MalformedFormat
            | PipelineError::DisallowedTld => "Invalid URL format",
            PipelineError::DomainUnresolvable => "Domain does not exist",
            PipelineError::EncodingFailure(_) => "QR generation failed",
            PipelineError::PayloadTooLarge => "Request body too large",
            PipelineError::UnreadableBody(_) => "Invalid request body",
        }
    }
}

impl From<InvalidReason> for PipelineError {
    fn from(reason: InvalidReason) -> Self {
        match reason {
            InvalidReason::Empty => PipelineError::EmptyInput,
            InvalidReason::MalformedFormat => PipelineError::MalformedFormat,
            InvalidReason::DisallowedTld => PipelineError::DisallowedTld,
        }
    }
}

impl From<EncodeError> for PipelineError {
    fn from(e: EncodeError) -> Self {
        PipelineError::EncodingFailure(e.to_string())
    }
}

/// Return a short about/version line for the binary to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{} - link validation library loaded", pkg, ver)
}

pub mod adapters;
pub mod normalize;
pub mod service;
pub mod validate;
