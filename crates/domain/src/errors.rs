//! 领域模型错误定义
//!
//! 业务规则错误和存储层错误分开定义，应用层再把两者统一映射。

use chrono::NaiveDate;
use thiserror::Error;

use crate::value_objects::PostId;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 输入参数不合法
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 保留用户名，不允许注册
    #[error("username '{0}' is reserved")]
    ReservedUsername(String),

    /// 用户名已被占用
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// 帖子标题已被占用
    #[error("post title '{0}' is already taken")]
    TitleTaken(String),

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("post {0} not found")]
    PostNotFound(PostId),

    /// 统计区间起点晚于终点
    #[error("date_from {from} must not be greater than date_to {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
}

impl DomainError {
    /// 创建参数错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;

/// 存储层错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
