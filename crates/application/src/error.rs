use std::fmt;

use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::password::PasswordHasherError;
use crate::token::TokenError;

/// 认证失败的具体原因，对应不同的 401 提示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    TokenExpired,
    CouldNotValidate,
    IncorrectCredentials,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = match self {
            AuthFailure::TokenExpired => "Token expired",
            AuthFailure::CouldNotValidate => "Could not validate credentials",
            AuthFailure::IncorrectCredentials => "Incorrect username or password",
        };
        f.write_str(detail)
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("password error: {0}")]
    Password(#[from] PasswordHasherError),
    #[error("token error: {0}")]
    Token(TokenError),
    #[error("authentication failed: {0}")]
    Authentication(AuthFailure),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Repository(value)
    }
}

impl From<TokenError> for ApplicationError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Expired => ApplicationError::Authentication(AuthFailure::TokenExpired),
            TokenError::Invalid => ApplicationError::Authentication(AuthFailure::CouldNotValidate),
            other => ApplicationError::Token(other),
        }
    }
}
