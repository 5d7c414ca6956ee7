use axum::{body::Body, http::Request};
use tracing::{info_span, Span};
use uuid::Uuid;

/// Root span for every request, tagged with a fresh request id so the
/// handler's log lines can be correlated.
pub fn request_span(request: &Request<Body>) -> Span {
    info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        uri = %request.uri(),
    )
}
