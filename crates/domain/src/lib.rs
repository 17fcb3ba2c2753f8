//! 社交网络后端核心领域模型
//!
//! 包含用户、帖子、点赞等实体，按天聚合点赞的规则，以及存储层接口。

pub mod business_rules;
pub mod errors;
pub mod like;
pub mod post;
pub mod repository;
pub mod user;
pub mod value_objects;

// 重新导出常用类型
pub use business_rules::*;
pub use errors::*;
pub use like::*;
pub use post::*;
pub use repository::*;
pub use user::*;
pub use value_objects::*;
