//! Caller identity.
//!
//! Authentication happens upstream; the gateway forwards the resolved user
//! id in `X-User-Id` and this service trusts it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;
use uuid::Uuid;

use super::problem_details;
use crate::exercise::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller of a `/api/v1` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| problem_details::unauthorized("missing X-User-Id header"))?;

        raw.to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .filter(|id| !id.is_nil())
            .map(Caller)
            .ok_or_else(|| problem_details::unauthorized("invalid X-User-Id header"))
    }
}
