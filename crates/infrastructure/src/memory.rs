//! 进程内存储
//!
//! 用于测试和本地演示，不持久化。唯一性和引用检查都在同一把锁内完成，
//! 与数据库约束的语义一致：并发注册同名用户只有一个成功，同一对
//! (用户, 帖子) 只会有一条点赞。

use std::collections::BTreeMap;
use std::sync::Arc;

use application::Clock;
use domain::{
    DailyLikeCount, DateRange, Like, LikeOutcome, LikeRepository, LikeStats, PasswordHash, Post,
    PostId, PostRepository, PostTitle, RepositoryError, RepositoryFuture, RowCreationResult,
    Timestamp, User, UserCredentials, UserId, UserRepository, Username,
};
use tokio::sync::Mutex;

struct StoredPost {
    author_id: UserId,
    title: PostTitle,
    body: String,
}

#[derive(Default)]
struct State {
    next_user_id: i32,
    next_post_id: i32,
    users: BTreeMap<UserId, UserCredentials>,
    posts: BTreeMap<PostId, StoredPost>,
    likes: BTreeMap<(UserId, PostId), Like>,
}

impl State {
    fn like_count(&self, post_id: PostId) -> i64 {
        self.likes.keys().filter(|(_, post)| *post == post_id).count() as i64
    }

    fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id).map(|credentials| &mut credentials.user)
    }
}

/// 同时实现三个仓储接口的内存存储。
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }
}

impl UserRepository for InMemoryStore {
    fn insert(
        &self,
        username: Username,
        password_hash: PasswordHash,
    ) -> RepositoryFuture<RowCreationResult<User>> {
        let state = self.state.clone();
        Box::pin(async move {
            let mut state = state.lock().await;
            if state
                .users
                .values()
                .any(|existing| existing.user.username == username)
            {
                return Ok(RowCreationResult::AlreadyExists);
            }

            state.next_user_id += 1;
            let user = User::registered(UserId(state.next_user_id), username);
            state.users.insert(
                user.id,
                UserCredentials {
                    user: user.clone(),
                    password_hash,
                },
            );
            Ok(RowCreationResult::Created(user))
        })
    }

    fn find_by_username(&self, username: Username) -> RepositoryFuture<Option<UserCredentials>> {
        let state = self.state.clone();
        Box::pin(async move {
            let state = state.lock().await;
            Ok(state
                .users
                .values()
                .find(|credentials| credentials.user.username == username)
                .cloned())
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<User>> {
        let state = self.state.clone();
        Box::pin(async move {
            let state = state.lock().await;
            Ok(state
                .users
                .values()
                .map(|credentials| credentials.user.clone())
                .collect())
        })
    }

    fn touch_last_visit(&self, id: UserId, at: Timestamp) -> RepositoryFuture<()> {
        let state = self.state.clone();
        Box::pin(async move {
            let mut state = state.lock().await;
            if let Some(user) = state.user_mut(id) {
                user.last_visit = Some(at);
            }
            Ok(())
        })
    }

    fn touch_last_login(&self, id: UserId, at: Timestamp) -> RepositoryFuture<()> {
        let state = self.state.clone();
        Box::pin(async move {
            let mut state = state.lock().await;
            if let Some(user) = state.user_mut(id) {
                user.last_login = Some(at);
            }
            Ok(())
        })
    }
}

impl PostRepository for InMemoryStore {
    fn insert(
        &self,
        author_id: UserId,
        title: PostTitle,
        body: String,
    ) -> RepositoryFuture<RowCreationResult<PostId>> {
        let state = self.state.clone();
        Box::pin(async move {
            let mut state = state.lock().await;
            if state.posts.values().any(|post| post.title == title) {
                return Ok(RowCreationResult::AlreadyExists);
            }
            if !state.users.contains_key(&author_id) {
                return Ok(RowCreationResult::MissingReference);
            }

            state.next_post_id += 1;
            let id = PostId(state.next_post_id);
            state.posts.insert(
                id,
                StoredPost {
                    author_id,
                    title,
                    body,
                },
            );
            Ok(RowCreationResult::Created(id))
        })
    }

    fn select(&self, ids: Option<Vec<PostId>>) -> RepositoryFuture<Vec<Post>> {
        let state = self.state.clone();
        Box::pin(async move {
            let state = state.lock().await;
            state
                .posts
                .iter()
                .filter(|(id, _)| ids.as_ref().map_or(true, |ids| ids.contains(id)))
                .map(|(id, stored)| {
                    let author = state
                        .users
                        .get(&stored.author_id)
                        .map(|credentials| credentials.user.clone())
                        .ok_or_else(|| {
                            RepositoryError::storage(format!(
                                "post {id} references missing user {}",
                                stored.author_id
                            ))
                        })?;

                    Ok(Post {
                        id: *id,
                        title: stored.title.clone(),
                        body: stored.body.clone(),
                        author,
                        like_count: state.like_count(*id),
                    })
                })
                .collect()
        })
    }

    fn like_count(&self, id: PostId) -> RepositoryFuture<i64> {
        let state = self.state.clone();
        Box::pin(async move { Ok(state.lock().await.like_count(id)) })
    }
}

impl LikeRepository for InMemoryStore {
    fn create(&self, user_id: UserId, post_id: PostId) -> RepositoryFuture<LikeOutcome> {
        let state = self.state.clone();
        let datetime = self.clock.now();
        Box::pin(async move {
            let mut state = state.lock().await;
            if state.likes.contains_key(&(user_id, post_id)) {
                return Ok(LikeOutcome::AlreadyLiked);
            }
            if !state.users.contains_key(&user_id) || !state.posts.contains_key(&post_id) {
                return Ok(LikeOutcome::NoSuchUserOrPost);
            }

            state.likes.insert(
                (user_id, post_id),
                Like {
                    user_id,
                    post_id,
                    datetime,
                },
            );
            Ok(LikeOutcome::Created)
        })
    }

    fn delete(&self, user_id: UserId, post_id: PostId) -> RepositoryFuture<bool> {
        let state = self.state.clone();
        Box::pin(async move {
            let mut state = state.lock().await;
            Ok(state.likes.remove(&(user_id, post_id)).is_some())
        })
    }

    fn like_stats(&self, range: DateRange) -> RepositoryFuture<LikeStats> {
        let state = self.state.clone();
        Box::pin(async move {
            let state = state.lock().await;
            let mut grouped: BTreeMap<(chrono::NaiveDate, PostId), i64> = BTreeMap::new();
            for like in state.likes.values() {
                let day = like.datetime.date();
                if range.contains(day) {
                    *grouped.entry((day, like.post_id)).or_default() += 1;
                }
            }

            Ok(LikeStats::collect(
                range,
                grouped
                    .into_iter()
                    .map(|((day, post_id), count)| DailyLikeCount {
                        day,
                        post_id,
                        count,
                    }),
            ))
        })
    }
}
