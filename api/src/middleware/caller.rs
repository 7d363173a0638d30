//! Caller identity extractor.
//!
//! Authentication happens upstream; the gateway forwards the authenticated user's id in
//! `X-User-Id`. Requests without a well-formed id are rejected with 401.

use actix_web::error::InternalError;
use actix_web::{dev::Payload, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use ekyc_core::errors::DomainError;

use crate::handlers::handle_domain_error;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Authenticated user on whose behalf the request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Uuid,
}

impl CallerIdentity {
    fn from_headers(req: &HttpRequest) -> Result<Self, DomainError> {
        let raw = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| DomainError::Unauthorized {
                message: "missing caller identity".to_string(),
            })?;

        let user_id = Uuid::parse_str(raw).map_err(|_| DomainError::Unauthorized {
            message: "invalid caller identity".to_string(),
        })?;

        Ok(Self { user_id })
    }
}

impl FromRequest for CallerIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = Self::from_headers(req).map_err(|e| {
            let response = handle_domain_error(&e);
            InternalError::from_response(e, response).into()
        });
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_reads_user_id_header() {
        let user_id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, user_id.to_string()))
            .to_http_request();

        assert_eq!(CallerIdentity::from_headers(&req).unwrap().user_id, user_id);
    }

    #[test]
    fn test_missing_or_malformed_header_is_unauthorized() {
        let missing = TestRequest::default().to_http_request();
        assert!(matches!(
            CallerIdentity::from_headers(&missing),
            Err(DomainError::Unauthorized { .. })
        ));

        let malformed = TestRequest::default()
            .insert_header((USER_ID_HEADER, "user-42"))
            .to_http_request();
        assert!(matches!(
            CallerIdentity::from_headers(&malformed),
            Err(DomainError::Unauthorized { .. })
        ));
    }
}
