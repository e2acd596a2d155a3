//! Response handling and transformation.
//!
//! # Responsibilities
//! - Write relayed upstream replies (status, bytes, content type, cache hint)
//! - Map proxy errors to HTTP status codes with a JSON `detail` body
//!
//! CORS headers are added by the middleware in `cors.rs`, not here, so that
//! every response (including 404/405 fallbacks) gets them.

use axum::body::Body;
use axum::http::{header, HeaderValue, Response as HttpResponse};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::proxy::{ProxyError, ProxyResponse};

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = HttpResponse::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, self.content_type);
        if let Some(value) = self
            .cache_control
            .as_deref()
            .and_then(|v| HeaderValue::from_str(v).ok())
        {
            headers.insert(header::CACHE_CONTROL, value);
        }

        response
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Bytes};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn relayed_response_keeps_status_and_bytes() {
        let body = Bytes::from_static(&[0x00, 0xff, 0x10, b'<']);
        let response = ProxyResponse {
            status: StatusCode::IM_A_TEAPOT,
            body: body.clone(),
            content_type: HeaderValue::from_static("application/xml; charset=windows-1251"),
            cache_control: Some("public, max-age=300".into()),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/xml; charset=windows-1251"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "public, max-age=300");
        assert_eq!(to_bytes(response.into_body(), usize::MAX).await.unwrap(), body);
    }

    #[tokio::test]
    async fn error_renders_detail_json() {
        let response = ProxyError::Timeout(30.0).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["detail"], "Upstream request timed out after 30s");
    }

    #[test]
    fn non_ascii_content_type_is_kept_as_received() {
        let raw = "text/xml; name=\"курс.xml\"".as_bytes();
        let response = ProxyResponse {
            status: StatusCode::OK,
            body: Bytes::new(),
            content_type: HeaderValue::from_bytes(raw).unwrap(),
            cache_control: None,
        }
        .into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE].as_bytes(), raw);
    }

    #[test]
    fn no_cache_header_when_disabled() {
        let response = ProxyResponse {
            status: StatusCode::OK,
            body: Bytes::new(),
            content_type: HeaderValue::from_static("text/plain"),
            cache_control: None,
        }
        .into_response();
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }
}
