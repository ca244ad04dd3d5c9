use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::{HeaderName, HeaderValue, Request, request::Parts},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuses a caller-supplied `x-request-id` when it is sane, otherwise mints a UUID.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidOrHeader;

impl MakeRequestId for MakeRequestUuidOrHeader {
    fn make_request_id<B>(&mut self, request: &Request<B>) -> Option<RequestId> {
        let value = request
            .headers()
            .get(&X_REQUEST_ID)
            .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
            .cloned()
            .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok())?;

        Some(RequestId::new(value))
    }
}

/// The `{id}` path segment of a user route.
///
/// A segment that is not a UUID cannot name any user, so it is reported as not found.
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for UserIdPath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        Uuid::parse_str(&raw).map(Self).map_err(|_| AppError::user_not_found(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_request_id_is_generated() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let id = MakeRequestUuidOrHeader.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }

    #[test]
    fn test_request_id_header_is_reused() {
        let request = Request::builder().uri("/").header("x-request-id", "abc-123").body(Body::empty()).unwrap();
        let id = MakeRequestUuidOrHeader.make_request_id(&request).unwrap();
        assert_eq!(id.header_value(), "abc-123");
    }

    #[test]
    fn test_oversized_request_id_is_replaced() {
        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        let request = Request::builder().uri("/").header("x-request-id", long.as_str()).body(Body::empty()).unwrap();
        let id = MakeRequestUuidOrHeader.make_request_id(&request).unwrap();
        assert_ne!(id.header_value(), long.as_str());
    }
}
