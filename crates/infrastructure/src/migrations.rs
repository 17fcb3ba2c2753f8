use sqlx::migrate::Migrator;

/// 工作区根目录 `migrations/` 下的全部迁移，编译期嵌入。
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
