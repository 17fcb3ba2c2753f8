use application::{ApplicationError, AuthFailure};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        ApiError::unauthorized(failure.to_string())
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Domain(err) => match err {
                DomainError::InvalidArgument { field, reason } => ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "INVALID_ARGUMENT",
                    format!("{field}: {reason}"),
                ),
                DomainError::ReservedUsername(_) => ApiError::new(
                    StatusCode::CONFLICT,
                    "USERNAME_RESERVED",
                    "This username is not allowed",
                ),
                DomainError::UsernameTaken(_) => ApiError::new(
                    StatusCode::CONFLICT,
                    "USERNAME_TAKEN",
                    "This username is already taken",
                ),
                DomainError::TitleTaken(_) => ApiError::new(
                    StatusCode::CONFLICT,
                    "TITLE_TAKEN",
                    "Post with this title already exists",
                ),
                DomainError::UserNotFound(_) => {
                    ApiError::new(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found")
                }
                DomainError::PostNotFound(_) => {
                    ApiError::new(StatusCode::NOT_FOUND, "POST_NOT_FOUND", "Post not found")
                }
                err @ DomainError::InvalidDateRange { .. } => {
                    ApiError::new(StatusCode::BAD_REQUEST, "INVALID_DATE_RANGE", err.to_string())
                }
            },
            ApplicationError::Repository(repo_err) => match repo_err {
                RepositoryError::NotFound => ApiError::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "requested resource not found",
                ),
                RepositoryError::Storage { message } => {
                    tracing::error!(%message, "storage failure");
                    ApiError::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DATABASE_ERROR",
                        "database error",
                    )
                }
            },
            ApplicationError::Password(err) => {
                tracing::error!(error = %err, "password hashing failure");
                ApiError::internal_server_error("password error")
            }
            ApplicationError::Token(err) => {
                tracing::error!(error = %err, "token signing failure");
                ApiError::internal_server_error("token error")
            }
            ApplicationError::Authentication(failure) => failure.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let challenge = self.status == StatusCode::UNAUTHORIZED;
        let mut response = (self.status, Json(self.body)).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::PostId;

    #[test]
    fn authentication_failures_carry_bearer_challenge() {
        let response =
            ApiError::from(ApplicationError::Authentication(AuthFailure::TokenExpired))
                .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::UsernameTaken("a".into()), StatusCode::CONFLICT),
            (DomainError::ReservedUsername("me".into()), StatusCode::CONFLICT),
            (DomainError::TitleTaken("t".into()), StatusCode::CONFLICT),
            (DomainError::UserNotFound("a".into()), StatusCode::NOT_FOUND),
            (DomainError::PostNotFound(PostId(1)), StatusCode::NOT_FOUND),
            (
                DomainError::invalid_argument("username", "cannot be empty"),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(ApplicationError::from(err)).status(), status);
        }
    }

    #[test]
    fn storage_errors_hide_details() {
        let err = ApiError::from(ApplicationError::from(RepositoryError::storage(
            "connection refused",
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.body.message.contains("connection refused"));
    }
}
