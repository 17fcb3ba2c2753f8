//! 最近访问 / 最近登录时间的记录。
//!
//! 写入失败只记日志，不影响触发它的请求。

use std::sync::Arc;

use domain::{UserId, UserRepository};

use crate::clock::Clock;

#[derive(Clone)]
pub struct SessionTracker {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl SessionTracker {
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    pub async fn record_visit(&self, user_id: UserId) {
        let now = self.clock.now();
        if let Err(err) = self.users.touch_last_visit(user_id, now).await {
            tracing::warn!(%user_id, error = %err, "failed to update last_visit");
        }
    }

    pub async fn record_login(&self, user_id: UserId) {
        let now = self.clock.now();
        if let Err(err) = self.users.touch_last_login(user_id, now).await {
            tracing::warn!(%user_id, error = %err, "failed to update last_login");
        }
    }
}
