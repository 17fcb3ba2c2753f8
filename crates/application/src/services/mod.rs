mod analytics_service;
mod post_service;
mod user_service;

pub use analytics_service::AnalyticsService;
pub use post_service::{
    CreatePostRequest, LikeStatus, PostService, PostServiceDependencies, UnlikeStatus,
};
pub use user_service::{
    AccessToken, LoginRequest, SignupRequest, UserService, UserServiceDependencies,
};
