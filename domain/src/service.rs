use tracing::{debug, warn};

use crate::validate::validate;
use crate::{DomainResolver, EncodedImage, PipelineError, QrEncoder};

/// Application service sequencing validation, resolution and encoding of a
/// user-supplied link.
///
/// It stays generic over the resolver and encoder so the pipeline can be
/// exercised with deterministic stubs. Each stage produces a new value and the
/// first failure ends the request; nothing is retried.
pub struct QrService<R: DomainResolver, E: QrEncoder> {
    resolver: R,
    encoder: E,
}

impl<R: DomainResolver, E: QrEncoder> QrService<R, E> {
    pub fn new(resolver: R, encoder: E) -> Self {
        Self { resolver, encoder }
    }

    /// Validate, confirm the domain resolves, then encode the canonical URL.
    pub async fn generate(&self, raw: &str) -> Result<EncodedImage, PipelineError> {
        let canonical = validate(raw).into_result().map_err(|reason| {
            debug!(%reason, "link rejected by validator");
            PipelineError::from(reason)
        })?;

        let host = canonical.hostname().map_err(|reason| {
            warn!(url = %canonical, "validated url has no usable hostname");
            PipelineError::from(reason)
        })?;

        if !self.resolver.resolves(&host).await {
            debug!(%host, "domain did not resolve");
            return Err(PipelineError::DomainUnresolvable);
        }

        let image = self.encoder.encode(&canonical).await.map_err(|e| {
            warn!(url = %canonical, err = %e, "encoder failed");
            PipelineError::from(e)
        })?;
        debug!(url = %canonical, bytes = image.base64().len(), "qr generated");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stub::{CountingResolver, EchoEncoder, FailingEncoder, StaticResolver};
    use std::sync::Arc;

    #[tokio::test]
    async fn success_encodes_exactly_the_canonical_url() {
        let svc = QrService::new(StaticResolver(true), EchoEncoder);
        let img = svc.generate("example.com").await.expect("generated");
        let payload = String::from_utf8(img.decode().unwrap()).unwrap();
        assert_eq!(payload, "https://example.com");
    }

    #[tokio::test]
    async fn unresolvable_domain_fails_before_encoding() {
        let svc = QrService::new(StaticResolver(false), FailingEncoder);
        let err = svc.generate("thisdomaindoesnotexist.io").await.unwrap_err();
        assert_eq!(err, PipelineError::DomainUnresolvable);
        assert_eq!(err.public_message(), "Domain does not exist");
    }

    #[tokio::test]
    async fn encoder_failure_is_server_fault() {
        let svc = QrService::new(StaticResolver(true), FailingEncoder);
        let err = svc.generate("https://www.example.org").await.unwrap_err();
        assert!(matches!(err, PipelineError::EncodingFailure(_)));
        assert!(!err.is_client_fault());
        assert_eq!(err.public_message(), "QR generation failed");
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_resolver() {
        let resolver = Arc::new(CountingResolver::new(true));
        let svc = QrService::new(resolver.clone(), EchoEncoder);

        assert_eq!(svc.generate("  ").await.unwrap_err(), PipelineError::EmptyInput);
        assert_eq!(
            svc.generate("mail.google.com").await.unwrap_err(),
            PipelineError::MalformedFormat
        );
        assert_eq!(
            svc.generate("google.xyz").await.unwrap_err(),
            PipelineError::DisallowedTld
        );
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn resolver_sees_hostname_once() {
        let resolver = Arc::new(CountingResolver::new(true));
        let svc = QrService::new(resolver.clone(), EchoEncoder);
        svc.generate("www.example.dev").await.unwrap();
        assert_eq!(resolver.calls(), 1);
        assert_eq!(resolver.last_host().as_deref(), Some("www.example.dev"));
    }
}
