//! Bearer 令牌认证
//!
//! 需要登录的处理函数直接声明 [`CurrentUser`] 参数即可。

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use domain::User;

use crate::{error::ApiError, state::AppState};

/// 通过 `Authorization: Bearer <token>` 认证的当前用户。
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;
        let user = state.user_service.current_user(token).await?;
        Ok(CurrentUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
