//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的用例服务。

mod auth;
mod error;
mod routes;
mod state;

pub use auth::CurrentUser;
pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use state::AppState;
