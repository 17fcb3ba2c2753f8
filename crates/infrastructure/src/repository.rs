use std::sync::Arc;

use application::Clock;
use chrono::NaiveDate;
use config::DatabaseConfig;
use domain::{
    DailyLikeCount, DateRange, LikeOutcome, LikeRepository, LikeStats, PasswordHash, Post, PostId,
    PostRepository, PostTitle, RepositoryError, RepositoryFuture, RepositoryResult,
    RowCreationResult, Timestamp, User, UserCredentials, UserId, UserRepository, Username,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        other => RepositoryError::storage(other.to_string()),
    }
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

/// 把插入语句的约束冲突翻译成 [`RowCreationResult`]，其余错误照常返回。
fn classify_insert<T>(result: Result<T, sqlx::Error>) -> RepositoryResult<RowCreationResult<T>> {
    match result {
        Ok(value) => Ok(RowCreationResult::Created(value)),
        Err(sqlx::Error::Database(ref db_err))
            if db_err.code().is_some_and(|code| code == UNIQUE_VIOLATION) =>
        {
            Ok(RowCreationResult::AlreadyExists)
        }
        Err(sqlx::Error::Database(ref db_err))
            if db_err.code().is_some_and(|code| code == FOREIGN_KEY_VIOLATION) =>
        {
            Ok(RowCreationResult::MissingReference)
        }
        Err(other) => Err(map_sqlx_err(other)),
    }
}

#[derive(Debug, FromRow)]
struct UserRecord {
    id: i32,
    username: String,
    last_visit: Option<Timestamp>,
    last_login: Option<Timestamp>,
}

impl TryFrom<UserRecord> for User {
    type Error = RepositoryError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let username =
            Username::parse(value.username).map_err(|err| invalid_data(err.to_string()))?;

        Ok(User {
            id: UserId::from(value.id),
            username,
            last_visit: value.last_visit,
            last_login: value.last_login,
        })
    }
}

#[derive(Debug, FromRow)]
struct CredentialsRecord {
    id: i32,
    username: String,
    password_hash: Option<String>,
    last_visit: Option<Timestamp>,
    last_login: Option<Timestamp>,
}

impl TryFrom<CredentialsRecord> for UserCredentials {
    type Error = RepositoryError;

    fn try_from(value: CredentialsRecord) -> Result<Self, Self::Error> {
        // 列允许为空，但没有哈希的账户无法登录
        let password_hash = value
            .password_hash
            .ok_or_else(|| invalid_data(format!("user {} has no password hash", value.id)))
            .and_then(|hash| {
                PasswordHash::new(hash).map_err(|err| invalid_data(err.to_string()))
            })?;

        let user = User::try_from(UserRecord {
            id: value.id,
            username: value.username,
            last_visit: value.last_visit,
            last_login: value.last_login,
        })?;

        Ok(UserCredentials {
            user,
            password_hash,
        })
    }
}

#[derive(Debug, FromRow)]
struct PostRecord {
    id: i32,
    title: String,
    body: String,
    author_id: i32,
    author_username: String,
    author_last_visit: Option<Timestamp>,
    author_last_login: Option<Timestamp>,
    like_count: i64,
}

impl TryFrom<PostRecord> for Post {
    type Error = RepositoryError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        let title = PostTitle::parse(value.title).map_err(|err| invalid_data(err.to_string()))?;
        let author = User::try_from(UserRecord {
            id: value.author_id,
            username: value.author_username,
            last_visit: value.author_last_visit,
            last_login: value.author_last_login,
        })?;

        Ok(Post {
            id: PostId::from(value.id),
            title,
            body: value.body,
            author,
            like_count: value.like_count,
        })
    }
}

#[derive(Debug, FromRow)]
struct DailyLikeRecord {
    day: NaiveDate,
    post_id: i32,
    count: i64,
}

impl From<DailyLikeRecord> for DailyLikeCount {
    fn from(value: DailyLikeRecord) -> Self {
        Self {
            day: value.day,
            post_id: PostId::from(value.post_id),
            count: value.count,
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn insert(
        &self,
        username: Username,
        password_hash: PasswordHash,
    ) -> RepositoryFuture<RowCreationResult<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query_as::<_, UserRecord>(
                r#"
                INSERT INTO app_user (username, password_hash)
                VALUES ($1, $2)
                RETURNING id, username, last_visit, last_login
                "#,
            )
            .bind(username.as_str())
            .bind(password_hash.as_str())
            .fetch_one(&pool)
            .await;

            match classify_insert(result)? {
                RowCreationResult::Created(record) => {
                    Ok(RowCreationResult::Created(User::try_from(record)?))
                }
                RowCreationResult::AlreadyExists => Ok(RowCreationResult::AlreadyExists),
                RowCreationResult::MissingReference => Ok(RowCreationResult::MissingReference),
            }
        })
    }

    fn find_by_username(&self, username: Username) -> RepositoryFuture<Option<UserCredentials>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, CredentialsRecord>(
                r#"
                SELECT id, username, password_hash, last_visit, last_login
                FROM app_user
                WHERE username = $1
                "#,
            )
            .bind(username.as_str())
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(UserCredentials::try_from).transpose()
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, UserRecord>(
                r#"
                SELECT id, username, last_visit, last_login
                FROM app_user
                ORDER BY id
                "#,
            )
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            records.into_iter().map(User::try_from).collect()
        })
    }

    fn touch_last_visit(&self, id: UserId, at: Timestamp) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("UPDATE app_user SET last_visit = $2 WHERE id = $1")
                .bind(i32::from(id))
                .bind(at)
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(())
        })
    }

    fn touch_last_login(&self, id: UserId, at: Timestamp) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("UPDATE app_user SET last_login = $2 WHERE id = $1")
                .bind(i32::from(id))
                .bind(at)
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(())
        })
    }
}

#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PostRepository for PgPostRepository {
    fn insert(
        &self,
        author_id: UserId,
        title: PostTitle,
        body: String,
    ) -> RepositoryFuture<RowCreationResult<PostId>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO post (author_id, title, body)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(i32::from(author_id))
            .bind(title.as_str())
            .bind(body)
            .fetch_one(&pool)
            .await
            .map(PostId::from);

            classify_insert(result)
        })
    }

    fn select(&self, ids: Option<Vec<PostId>>) -> RepositoryFuture<Vec<Post>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let ids: Option<Vec<i32>> = ids.map(|ids| ids.into_iter().map(i32::from).collect());
            let records = sqlx::query_as::<_, PostRecord>(
                r#"
                SELECT p.id, p.title, p.body,
                       u.id AS author_id,
                       u.username AS author_username,
                       u.last_visit AS author_last_visit,
                       u.last_login AS author_last_login,
                       COALESCE(l.like_count, 0) AS like_count
                FROM post p
                JOIN app_user u ON u.id = p.author_id
                LEFT JOIN (
                    SELECT post_id, COUNT(*) AS like_count
                    FROM user_like_post
                    GROUP BY post_id
                ) l ON l.post_id = p.id
                WHERE ($1::int4[] IS NULL OR p.id = ANY($1))
                ORDER BY p.id
                "#,
            )
            .bind(ids)
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            records.into_iter().map(Post::try_from).collect()
        })
    }

    fn like_count(&self, id: PostId) -> RepositoryFuture<i64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_like_post WHERE post_id = $1")
                .bind(i32::from(id))
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_err)
        })
    }
}

/// 点赞时间取自注入的 [`Clock`]，与会话记录和内存存储使用同一时间源。
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

impl LikeRepository for PgLikeRepository {
    fn create(&self, user_id: UserId, post_id: PostId) -> RepositoryFuture<LikeOutcome> {
        let pool = self.pool.clone();
        let at = self.clock.now();
        Box::pin(async move {
            let result = sqlx::query(
                "INSERT INTO user_like_post (user_id, post_id, datetime) VALUES ($1, $2, $3)",
            )
            .bind(i32::from(user_id))
            .bind(i32::from(post_id))
            .bind(at)
            .execute(&pool)
            .await
            .map(|_| ());

            classify_insert(result).map(LikeOutcome::from)
        })
    }

    fn delete(&self, user_id: UserId, post_id: PostId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result =
                sqlx::query("DELETE FROM user_like_post WHERE user_id = $1 AND post_id = $2")
                    .bind(i32::from(user_id))
                    .bind(i32::from(post_id))
                    .execute(&pool)
                    .await
                    .map_err(map_sqlx_err)?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn like_stats(&self, range: DateRange) -> RepositoryFuture<LikeStats> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, DailyLikeRecord>(
                r#"
                SELECT datetime::date AS day, post_id, COUNT(*) AS count
                FROM user_like_post
                WHERE datetime::date BETWEEN $1 AND $2
                GROUP BY day, post_id
                ORDER BY day, post_id
                "#,
            )
            .bind(range.start())
            .bind(range.end())
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(LikeStats::collect(
                range,
                records.into_iter().map(DailyLikeCount::from),
            ))
        })
    }
}

/// PostgreSQL 上的全部仓储，共用一个连接池。
#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub user_repository: Arc<PgUserRepository>,
    pub post_repository: Arc<PgPostRepository>,
    pub like_repository: Arc<PgLikeRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repository: Arc::new(PgUserRepository::new(pool.clone())),
            post_repository: Arc::new(PgPostRepository::new(pool.clone())),
            like_repository: Arc::new(PgLikeRepository::new(pool.clone(), clock)),
            pool,
        }
    }
}

/// 建立连接池；配置了 `time_zone` 时，每个新连接都切换到该会话时区。
pub async fn create_pg_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let mut options = PgPoolOptions::new().max_connections(config.max_connections);

    if let Some(zone) = config.time_zone.clone() {
        options = options.after_connect(move |conn, _meta| {
            let zone = zone.clone();
            Box::pin(async move {
                sqlx::query("SELECT set_config('TimeZone', $1, false)")
                    .bind(zone)
                    .execute(conn)
                    .await?;
                Ok(())
            })
        });
    }

    options.connect(&config.url).await
}
