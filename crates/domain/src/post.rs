use serde::{Deserialize, Serialize};

use crate::user::User;
use crate::value_objects::{PostId, PostTitle};

/// 帖子及其作者、读取时计算的点赞数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: PostTitle,
    pub body: String,
    pub author: User,
    pub like_count: i64,
}
