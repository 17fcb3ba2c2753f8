use std::sync::Arc;

use application::{
    AnalyticsService, Clock, PasswordHasher, PostService, PostServiceDependencies,
    SessionTracker, SystemClock, TokenService, UserService, UserServiceDependencies,
};
use config::AppConfig;
use domain::{LikeRepository, PostRepository, UserRepository};
use thiserror::Error;

use crate::{
    memory::InMemoryStore,
    migrations::MIGRATOR,
    password::BcryptPasswordHasher,
    repository::{create_pg_pool, PgStorage},
    token::JwtTokenService,
};

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// 装配好的适配器集合，应用层服务从这里取依赖。
#[derive(Clone)]
pub struct Infrastructure {
    pub user_repository: Arc<dyn UserRepository>,
    pub post_repository: Arc<dyn PostRepository>,
    pub like_repository: Arc<dyn LikeRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_service: Arc<dyn TokenService>,
    pub clock: Arc<dyn Clock>,
    access_token_lifetime: chrono::Duration,
}

impl Infrastructure {
    /// 连接 PostgreSQL 并执行迁移。
    pub async fn connect(config: &AppConfig) -> Result<Self, InfrastructureError> {
        let pool = create_pg_pool(&config.database).await?;
        MIGRATOR.run(&pool).await?;
        tracing::info!(
            max_connections = config.database.max_connections,
            time_zone = config.database.time_zone.as_deref().unwrap_or("UTC"),
            "database ready"
        );

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let storage = PgStorage::new(pool, clock.clone());
        Ok(Self::assemble(
            config,
            storage.user_repository,
            storage.post_repository,
            storage.like_repository,
            clock,
        ))
    }

    /// 进程内存储，用于测试和本地演示。
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::in_memory_with_clock(config, Arc::new(SystemClock))
    }

    pub fn in_memory_with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        Self::assemble(config, store.clone(), store.clone(), store, clock)
    }

    fn assemble(
        config: &AppConfig,
        user_repository: Arc<dyn UserRepository>,
        post_repository: Arc<dyn PostRepository>,
        like_repository: Arc<dyn LikeRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            post_repository,
            like_repository,
            password_hasher: Arc::new(BcryptPasswordHasher::from_config(&config.auth)),
            token_service: Arc::new(JwtTokenService::new(&config.auth.jwt_secret)),
            clock,
            access_token_lifetime: chrono::Duration::minutes(config.auth.access_token_minutes),
        }
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(UserServiceDependencies {
            user_repository: self.user_repository.clone(),
            password_hasher: self.password_hasher.clone(),
            token_service: self.token_service.clone(),
            session_tracker: SessionTracker::new(self.user_repository.clone(), self.clock.clone()),
            access_token_lifetime: self.access_token_lifetime,
        })
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(PostServiceDependencies {
            post_repository: self.post_repository.clone(),
            like_repository: self.like_repository.clone(),
        })
    }

    pub fn analytics_service(&self) -> AnalyticsService {
        AnalyticsService::new(self.like_repository.clone())
    }
}
