//! HTTP middleware

pub mod metrics;

pub use metrics::{metrics_middleware, Metrics};

use axum::{extract::Request, middleware::Next, response::Response};

/// Log every response as `METHOD URL STATUS`
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!("{} {} {}", method, uri, response.status().as_u16());
    response
}
