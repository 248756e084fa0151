//! Request context middleware.
//!
//! [`request_context`] runs around every request:
//!
//! 1. Take the correlation ID from `X-Correlation-ID`, or generate one
//! 2. Store a [`RequestContext`] in the request extensions
//! 3. Run the handler inside an `http_request` span
//! 4. Log status and latency, and echo the correlation ID in the response
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware};
//! use boxoffice_web::middleware::request_context;
//!
//! let app = Router::new()
//!     .route("/api/v1/access/me", get(me))
//!     .layer(middleware::from_fn(request_context));
//! ```

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Per-request data stored in the request extensions.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// Correlation ID of the request.
    pub correlation_id: Uuid,
}

/// Middleware function for `axum::middleware::from_fn`.
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let correlation_id = req
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    req.extensions_mut().insert(RequestContext { correlation_id });

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = Instant::now();
        let mut response = next.run(req).await;

        let status = response.status();
        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = started.elapsed().as_millis() as u64;
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), latency_ms, "Request completed");
        } else {
            tracing::info!(status = status.as_u16(), latency_ms, "Request completed");
        }

        if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
            response.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/ctx",
                get(|Extension(ctx): Extension<RequestContext>| async move {
                    ctx.correlation_id.to_string()
                }),
            )
            .layer(middleware::from_fn(request_context))
    }

    #[tokio::test]
    async fn test_correlation_id_generated_if_missing() {
        let response = app()
            .oneshot(Request::builder().uri("/ctx").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present")
            .to_str()
            .unwrap()
            .to_string();
        assert!(Uuid::parse_str(&header).is_ok());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, header.as_bytes());
    }

    #[tokio::test]
    async fn test_correlation_id_preserved_from_request() {
        let id = Uuid::new_v4();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/ctx")
                    .header(CORRELATION_ID_HEADER, id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(CORRELATION_ID_HEADER).unwrap(),
            &id.to_string()
        );
    }

    #[tokio::test]
    async fn test_invalid_correlation_id_replaced() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/ctx")
                    .header(CORRELATION_ID_HEADER, "not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let header = response.headers().get(CORRELATION_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(header.to_str().unwrap()).is_ok());
    }
}
