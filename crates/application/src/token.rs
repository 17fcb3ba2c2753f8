//! 访问令牌接口
//!
//! 令牌只编码用户名和绝对过期时间；"用户是否仍然存在" 由上层检查。

use chrono::Duration;
use domain::Username;
use thiserror::Error;

/// 默认访问令牌有效期（分钟）
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    /// 签名、格式或缺少 subject
    #[error("invalid token")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

pub trait TokenService: Send + Sync {
    /// `expires_in` 可以为负，用来签发一个已经过期的令牌。
    fn create_access_token(
        &self,
        subject: &Username,
        expires_in: Duration,
    ) -> Result<String, TokenError>;

    fn validate(&self, token: &str) -> Result<Username, TokenError>;
}
