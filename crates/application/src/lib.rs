//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务：注册登录、帖子与点赞、点赞统计，
//! 以及对外部适配器（密码哈希、访问令牌、时钟）的抽象。

pub mod clock;
pub mod dto;
pub mod error;
pub mod password;
pub mod services;
pub mod session;
pub mod token;

pub use clock::{Clock, SystemClock};
pub use dto::{CreatedPostDto, PostDto, SignupDto, UserDto};
pub use error::{ApplicationError, AuthFailure};
pub use password::{PasswordHasher, PasswordHasherError};
pub use services::{
    AccessToken, AnalyticsService, CreatePostRequest, LikeStatus, LoginRequest, PostService,
    PostServiceDependencies, SignupRequest, UnlikeStatus, UserService, UserServiceDependencies,
};
pub use session::SessionTracker;
pub use token::{TokenError, TokenService, DEFAULT_ACCESS_TOKEN_MINUTES};
