//! 不依赖存储的业务规则。

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::Username;

/// 与路由冲突、不允许注册的用户名。
pub const RESERVED_USERNAMES: &[&str] = &["me"];

pub fn ensure_not_reserved(username: &Username) -> DomainResult<()> {
    if RESERVED_USERNAMES.contains(&username.as_str()) {
        return Err(DomainError::ReservedUsername(username.as_str().to_owned()));
    }
    Ok(())
}
