use serde::{Deserialize, Serialize};

use crate::value_objects::{PasswordHash, Timestamp, UserId, Username};

/// 对外可见的用户信息，不包含密码哈希。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub last_visit: Option<Timestamp>,
    pub last_login: Option<Timestamp>,
}

impl User {
    /// 刚注册、尚未有任何访问记录的用户。
    pub fn registered(id: UserId, username: Username) -> Self {
        Self {
            id,
            username,
            last_visit: None,
            last_login: None,
        }
    }
}

/// 认证路径使用的用户记录，带密码哈希。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}
