//! Mapping of domain errors onto HTTP responses

use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use validator::ValidationErrors;

use ekyc_core::errors::{DomainError, ErrorKind, KycError, RetryHint};
use ekyc_shared::errors::{error_codes, ErrorResponse};

pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_code(error: &DomainError) -> &'static str {
    match error {
        DomainError::Kyc(KycError::OtpExpired { .. }) => error_codes::OTP_EXPIRED,
        DomainError::Kyc(KycError::AttemptsExhausted { .. }) => error_codes::OTP_ATTEMPTS_EXHAUSTED,
        DomainError::Kyc(KycError::OtpRejected { .. }) => error_codes::OTP_REJECTED,
        DomainError::Kyc(KycError::AlreadyVerified) => error_codes::ALREADY_VERIFIED,
        _ => match error.kind() {
            ErrorKind::Validation => error_codes::VALIDATION_ERROR,
            ErrorKind::BadRequest => error_codes::BAD_REQUEST,
            ErrorKind::RateLimited => error_codes::RATE_LIMIT_EXCEEDED,
            ErrorKind::Unauthorized => error_codes::UNAUTHORIZED,
            ErrorKind::Forbidden => error_codes::FORBIDDEN,
            ErrorKind::NotFound => error_codes::NOT_FOUND,
            ErrorKind::Cancelled => error_codes::CANCELLED,
            ErrorKind::Internal => error_codes::INTERNAL_ERROR,
        },
    }
}

/// Convert a domain error into a JSON error response carrying the retry hint
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    let status = status_for_kind(error.kind());
    let hint = error.retry_hint();

    if status.is_server_error() {
        tracing::error!(error = %error, status_code = status.as_u16(), "Request failed");
    } else {
        tracing::warn!(error = %error, status_code = status.as_u16(), "Request rejected");
    }

    // Internal detail stays in the logs
    let message = match error.kind() {
        ErrorKind::Internal => "An internal error occurred".to_string(),
        _ => error.to_string(),
    };

    let mut body = ErrorResponse::new(error_code(error), message, hint.as_str());
    let mut retry_after = None;

    if let DomainError::Kyc(kyc) = error {
        body = match kyc {
            KycError::OtpRejected {
                attempts_remaining, ..
            } => body.add_detail("attempts_remaining", attempts_remaining),
            KycError::AttemptsExhausted {
                attempts,
                max_attempts,
            } => body
                .add_detail("attempts", attempts)
                .add_detail("max_attempts", max_attempts),
            KycError::OtpExpired {
                elapsed_seconds,
                validity_seconds,
            } => body
                .add_detail("elapsed_seconds", elapsed_seconds)
                .add_detail("validity_seconds", validity_seconds),
            KycError::RateLimited {
                retry_after_seconds: Some(seconds),
                ..
            } => {
                retry_after = Some(*seconds);
                body.add_detail("retry_after_seconds", seconds)
            }
            _ => body,
        };
    }

    let mut response = HttpResponse::build(status);
    if let Some(seconds) = retry_after {
        response.insert_header((header::RETRY_AFTER, seconds.to_string()));
    }
    response.json(body)
}

/// 400 listing every field that failed request validation
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    let mut body = ErrorResponse::new(
        error_codes::VALIDATION_ERROR,
        "Invalid request data",
        RetryHint::None.as_str(),
    );

    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        body = body.add_detail(field, messages);
    }

    tracing::warn!(fields = ?errors.field_errors().keys().collect::<Vec<_>>(), "Request validation failed");
    HttpResponse::BadRequest().json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_table() {
        assert_eq!(status_for_kind(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_kind(ErrorKind::BadRequest), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_kind(ErrorKind::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_for_kind(ErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for_kind(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for_kind(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for_kind(ErrorKind::Cancelled), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_for_kind(ErrorKind::Internal),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_rejected_otp_reports_remaining_attempts() {
        let error: DomainError = KycError::OtpRejected {
            message: "Invalid OTP".to_string(),
            attempts_remaining: 2,
        }
        .into();

        let response = handle_domain_error(&error);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], error_codes::OTP_REJECTED);
        assert_eq!(body["retry_hint"], "retry_now");
        assert_eq!(body["details"]["attempts_remaining"], 2);
    }

    #[actix_web::test]
    async fn test_rate_limit_sets_retry_after() {
        let error: DomainError = KycError::RateLimited {
            message: "slow down".to_string(),
            retry_after_seconds: Some(60),
        }
        .into();

        let response = handle_domain_error(&error);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");

        let body = body_json(response).await;
        assert_eq!(body["retry_hint"], "retry_later");
    }

    #[actix_web::test]
    async fn test_internal_message_is_not_exposed() {
        let response = handle_domain_error(&DomainError::internal("db password wrong"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal error occurred");
        assert_eq!(body["retry_hint"], "retry_later");
    }
}
