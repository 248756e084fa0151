//! Axum integration for the box office backend.
//!
//! Shared HTTP plumbing used by the access-control handlers and the server
//! binary:
//!
//! - [`AppError`]: maps failures to `{ success: false, code, message }` JSON
//! - Extractors: [`CorrelationId`], [`ClientIp`], [`BearerToken`]
//! - [`request_context`]: correlation-id propagation and request logging
//! - [`handlers::health_check`]: liveness probe
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get, middleware};
//! use boxoffice_web::{handlers::health_check, request_context};
//!
//! let app = Router::new()
//!     .route("/health", get(health_check))
//!     .layer(middleware::from_fn(request_context));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::{BearerToken, ClientIp, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, RequestContext, request_context};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
