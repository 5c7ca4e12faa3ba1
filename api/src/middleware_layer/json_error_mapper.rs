use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{debug, info};

use crate::error_handler::AppError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

/// Reuses the caller's `X-Request-Id` or mints `req-<nanos>`.
fn request_id<B>(req: &Request<B>) -> String {
    if let Some(v) = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
    {
        if !v.trim().is_empty() {
            return v.to_string();
        }
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    format!("req-{nanos}")
}

/// Extractor rejections (bad JSON, wrong content type) come back as
/// 400/415/422 plain text. Handlers never produce those codes themselves.
fn is_rejection(status: StatusCode) -> bool {
    status == StatusCode::BAD_REQUEST
        || status == StatusCode::UNSUPPORTED_MEDIA_TYPE
        || status == StatusCode::UNPROCESSABLE_ENTITY
}

/// Tags each request with an id and rewrites extractor rejections into the
/// `{ "error": ... }` server-error shape used by every other failure.
pub async fn json_error_mapper(mut req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let id = request_id(&req);
    let header = HeaderValue::from_str(&id).ok();
    if let Some(h) = &header {
        req.headers_mut().insert(REQUEST_ID_HEADER, h.clone());
    }
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let res = next.run(req).await;
    let status = res.status();

    let mut res = if is_rejection(status) {
        let (_parts, bytes) = take_body(res).await;
        let original = String::from_utf8_lossy(&bytes);
        debug!(request_id = %id, %status, body = %original.trim(), "extractor rejection mapped");
        AppError::Request(original.trim().to_string()).into_response()
    } else {
        res
    };

    if let Some(h) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER, h);
    }

    info!(
        request_id = %id,
        %method,
        %path,
        status = res.status().as_u16(),
        latency_ms = started.elapsed().as_millis(),
        "request completed"
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_caller_request_id() {
        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(())
            .unwrap();
        assert_eq!(request_id(&req), "abc-123");

        let fresh = request_id(&Request::builder().body(()).unwrap());
        assert!(fresh.starts_with("req-"));
    }

    #[test]
    fn only_extractor_codes_are_rewritten() {
        assert!(is_rejection(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(is_rejection(StatusCode::UNSUPPORTED_MEDIA_TYPE));
        assert!(!is_rejection(StatusCode::NOT_FOUND));
        assert!(!is_rejection(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
