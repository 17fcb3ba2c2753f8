//! 存储层接口
//!
//! 唯一性和外键竞争全部交给存储层约束处理，实现方把约束冲突翻译成
//! [`RowCreationResult`] / [`LikeOutcome`]，而不是事先查询是否存在。

use futures::future::BoxFuture;

use crate::errors::RepositoryError;
use crate::like::{DateRange, LikeOutcome, LikeStats, RowCreationResult};
use crate::post::Post;
use crate::user::{User, UserCredentials};
use crate::value_objects::{PasswordHash, PostId, PostTitle, Timestamp, UserId, Username};

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type RepositoryFuture<T> = BoxFuture<'static, RepositoryResult<T>>;

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait UserRepository: Send + Sync {
    /// 用户名冲突时返回 `AlreadyExists`。
    fn insert(
        &self,
        username: Username,
        password_hash: PasswordHash,
    ) -> RepositoryFuture<RowCreationResult<User>>;
    fn find_by_username(&self, username: Username) -> RepositoryFuture<Option<UserCredentials>>;
    /// 按 id 升序。
    fn list(&self) -> RepositoryFuture<Vec<User>>;
    fn touch_last_visit(&self, id: UserId, at: Timestamp) -> RepositoryFuture<()>;
    fn touch_last_login(&self, id: UserId, at: Timestamp) -> RepositoryFuture<()>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait PostRepository: Send + Sync {
    /// 标题冲突时返回 `AlreadyExists`，作者不存在时返回 `MissingReference`。
    fn insert(
        &self,
        author_id: UserId,
        title: PostTitle,
        body: String,
    ) -> RepositoryFuture<RowCreationResult<PostId>>;
    /// `ids` 为 `None` 时返回全部帖子；按 id 升序，附带当前点赞数。
    fn select(&self, ids: Option<Vec<PostId>>) -> RepositoryFuture<Vec<Post>>;
    /// 帖子不存在时为 0。
    fn like_count(&self, id: PostId) -> RepositoryFuture<i64>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait LikeRepository: Send + Sync {
    fn create(&self, user_id: UserId, post_id: PostId) -> RepositoryFuture<LikeOutcome>;
    /// 删除了一行时返回 `true`。
    fn delete(&self, user_id: UserId, post_id: PostId) -> RepositoryFuture<bool>;
    /// 区间内每天都会出现，按点赞时间的日期部分分组。
    fn like_stats(&self, range: DateRange) -> RepositoryFuture<LikeStats>;
}
