//! Shared HTTP utilities for the link-to-QR workspace.
//!
//! Provides the request/response bodies and the mapping from pipeline
//! failures to HTTP status codes, independent of any web framework.

use domain::{EncodedImage, PipelineError};
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Largest request body accepted before the pipeline runs.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// ============================================================================
// Bodies
// ============================================================================

/// Success body: `{"dataUrl": "data:image/png;base64,..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOut {
    #[serde(rename = "dataUrl")]
    pub data_url: String,
}

impl From<&EncodedImage> for GenerateOut {
    fn from(img: &EncodedImage) -> Self {
        Self {
            data_url: img.to_data_url(),
        }
    }
}

/// Failure body: `{"error": "<message>"}`.
pub fn json_err(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

// ============================================================================
// Request field extraction
// ============================================================================

/// Pull the `url` field out of a decoded JSON body.
///
/// Missing, non-string and empty-string values are all `MissingUrl`.
pub fn url_field(body: &serde_json::Value) -> Result<&str, PipelineError> {
    match body.get("url").and_then(serde_json::Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(PipelineError::MissingUrl),
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// HTTP status for a pipeline failure.
pub fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        e if e.is_client_fault() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Status and JSON body for a pipeline failure. Internal causes are not included.
pub fn error_parts(err: &PipelineError) -> (StatusCode, serde_json::Value) {
    (status_for(err), json_err(err.public_message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_err_shape() {
        assert_eq!(json_err("Invalid URL"), json!({"error": "Invalid URL"}));
    }

    #[test]
    fn generate_out_uses_camel_case_field() {
        let out = GenerateOut::from(&EncodedImage::png(b"abc"));
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v, json!({"dataUrl": "data:image/png;base64,YWJj"}));
    }

    #[test]
    fn url_field_rules() {
        assert_eq!(url_field(&json!({"url": "google.com"})), Ok("google.com"));
        assert_eq!(url_field(&json!({"url": "  "})), Ok("  "));
        for body in [
            json!({}),
            json!({"url": ""}),
            json!({"url": 42}),
            json!({"url": null}),
            json!({"url": ["a"]}),
            json!([]),
            json!("google.com"),
        ] {
            assert_eq!(url_field(&body), Err(PipelineError::MissingUrl), "{body}");
        }
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(&PipelineError::MissingUrl), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&PipelineError::DisallowedTld), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&PipelineError::DomainUnresolvable),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&PipelineError::UnreadableBody("eof".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&PipelineError::PayloadTooLarge),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_for(&PipelineError::EncodingFailure("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_parts_hide_internal_cause() {
        let (status, body) = error_parts(&PipelineError::EncodingFailure("secret detail".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "QR generation failed"}));
    }
}
