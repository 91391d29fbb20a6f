//! Caller identity supplied by the upstream auth gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::CustomerId;

use crate::error::ApiError;

/// Header carrying the authenticated customer's id.
pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";

/// The authenticated customer making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity(pub CustomerId);

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CUSTOMER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Missing caller identity".to_string()))?;

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<CustomerId>().ok())
            .map(CallerIdentity)
            .ok_or_else(|| ApiError::Unauthorized("Invalid caller identity".to_string()))
    }
}
