//! Service middleware

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// Request timing middleware: logs method, path, status and elapsed time
/// for every request, warning on slow ones.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    if elapsed.as_millis() > 1000 {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            elapsed_ms = elapsed.as_millis(),
            "Slow request"
        );
    } else {
        tracing::info!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            elapsed_ms = elapsed.as_millis(),
            "Request handled"
        );
    }

    response
}
