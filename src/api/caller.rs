/// Caller identity as attached by the upstream auth layer
///
/// Token verification happens before requests reach this service; the
/// verified user id arrives in the `x-user-id` header.

use crate::error::ServiceError;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const CALLER_HEADER: &str = "x-user-id";

/// Authenticated caller id extracted from the request headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ServiceError::Unauthorized("Not authorized, no caller id".to_string()))?;

        Ok(CallerId(caller.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<CallerId, ServiceError> {
        let mut builder = Request::builder().uri("/workflows");
        if let Some(value) = header {
            builder = builder.header(CALLER_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CallerId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_header() {
        assert_eq!(extract(Some("alice")).await.unwrap(), CallerId("alice".into()));
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_unauthorized() {
        assert_matches!(extract(None).await, Err(ServiceError::Unauthorized(_)));
        assert_matches!(extract(Some("   ")).await, Err(ServiceError::Unauthorized(_)));
    }
}
