use std::sync::Arc;

use application::{AnalyticsService, PostService, UserService};
use infrastructure::Infrastructure;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub post_service: Arc<PostService>,
    pub analytics_service: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(
        user_service: Arc<UserService>,
        post_service: Arc<PostService>,
        analytics_service: Arc<AnalyticsService>,
    ) -> Self {
        Self {
            user_service,
            post_service,
            analytics_service,
        }
    }

    pub fn from_infrastructure(infra: &Infrastructure) -> Self {
        Self::new(
            Arc::new(infra.user_service()),
            Arc::new(infra.post_service()),
            Arc::new(infra.analytics_service()),
        )
    }
}
