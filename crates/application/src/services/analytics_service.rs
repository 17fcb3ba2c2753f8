use std::sync::Arc;

use chrono::NaiveDate;
use domain::{DateRange, LikeRepository, LikeStats};

use crate::error::ApplicationError;

/// 点赞按天统计
pub struct AnalyticsService {
    like_repository: Arc<dyn LikeRepository>,
}

impl AnalyticsService {
    pub fn new(like_repository: Arc<dyn LikeRepository>) -> Self {
        Self { like_repository }
    }

    pub async fn like_analytics(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<LikeStats, ApplicationError> {
        let range = DateRange::new(date_from, date_to)?;
        tracing::debug!(%date_from, %date_to, "computing like analytics");
        Ok(self.like_repository.like_stats(range).await?)
    }
}
