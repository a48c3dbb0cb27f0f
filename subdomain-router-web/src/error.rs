//! HTTP error mapping.

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use subdomain_router_core::CoreError;

/// A core error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        if e.is_expected() {
            tracing::warn!("{e}");
        } else {
            tracing::error!("{e}");
        }
        Self(e)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            CoreError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            CoreError::SubdomainNotFound(_) => StatusCode::NOT_FOUND,
            CoreError::ProviderCallFailed(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.0.to_string() }))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use subdomain_router_provider::ProviderError;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let status = |e: CoreError| ApiError(e).status_code();

        assert_eq!(status(CoreError::MissingParameter("name")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(CoreError::SubdomainNotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(CoreError::ProviderCallFailed(ProviderError::Timeout {
                provider: "cloudflare".to_string(),
                detail: "slow".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(CoreError::RegistryDecodeFailed("bad".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
