//! 基础设施层实现。
//!
//! 提供 PostgreSQL 与内存两套仓储、bcrypt 密码哈希和 JWT 令牌适配器，
//! 实现应用/领域层定义的接口。

pub mod builder;
pub mod memory;
pub mod migrations;
pub mod password;
pub mod repository;
pub mod token;

pub use builder::{Infrastructure, InfrastructureError};
pub use memory::InMemoryStore;
pub use migrations::MIGRATOR;
pub use password::BcryptPasswordHasher;
pub use repository::{
    create_pg_pool, PgLikeRepository, PgPostRepository, PgStorage, PgUserRepository,
};
pub use token::JwtTokenService;
