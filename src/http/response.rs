//! Response rendering.
//!
//! # Responsibilities
//! - Turn a `MockResponse` into an HTTP response
//! - Serialize bodies as JSON, leave absent bodies empty
//! - Render not-found as a bare 404
//!
//! # Design Decisions
//! - Variant headers are applied last, so they may override `content-type`
//! - Header names or values that HTTP cannot carry are skipped with a warning

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::response::MockResponse;

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            None => Response::new(Body::empty()),
            Some(body) => match serde_json::to_vec(&body) {
                Ok(bytes) => {
                    let mut response = Response::new(Body::from(bytes));
                    response
                        .headers_mut()
                        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    response
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize response body");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            },
        };

        *response.status_mut() = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        for (name, value) in self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Skipping header that is not valid HTTP"),
            }
        }
        response
    }
}

/// Response for requests no route matches.
pub fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn mock(body: Option<serde_json::Value>, headers: &[(&str, &str)]) -> MockResponse {
        MockResponse {
            status: 201,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            body,
        }
    }

    #[tokio::test]
    async fn test_json_body() {
        let response = mock(Some(json!({"a": 1})), &[("X-Custom", "yes")]).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()["x-custom"], "yes");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_empty_body() {
        let response = mock(None, &[]).into_response();
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_variant_overrides_content_type_and_skips_bad_headers() {
        let response = mock(
            Some(json!("plain")),
            &[("content-type", "text/plain"), ("bad header", "x"), ("x-ok", "line\nbreak")],
        )
        .into_response();
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers().len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_bare() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}
