//! 点赞相关的领域类型和按天聚合逻辑。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::DomainError;
use crate::value_objects::{PostId, Timestamp, UserId};

/// 单条点赞记录，`(user_id, post_id)` 唯一。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Like {
    pub user_id: UserId,
    pub post_id: PostId,
    pub datetime: Timestamp,
}

/// 插入一行时存储层约束给出的三种结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowCreationResult<T> {
    Created(T),
    /// 违反唯一约束
    AlreadyExists,
    /// 违反外键约束
    MissingReference,
}

/// 点赞操作的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Created,
    AlreadyLiked,
    NoSuchUserOrPost,
}

impl From<RowCreationResult<()>> for LikeOutcome {
    fn from(value: RowCreationResult<()>) -> Self {
        match value {
            RowCreationResult::Created(()) => LikeOutcome::Created,
            RowCreationResult::AlreadyExists => LikeOutcome::AlreadyLiked,
            RowCreationResult::MissingReference => LikeOutcome::NoSuchUserOrPost,
        }
    }
}

/// 闭区间 `[from, to]`，构造时保证 `from <= to`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, DomainError> {
        if from > to {
            return Err(DomainError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn start(&self) -> NaiveDate {
        self.from
    }

    pub fn end(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }

    /// 区间内的每一天，升序。
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |day| *day <= to)
    }
}

/// 存储层按 (日期, 帖子) 分组后的一行计数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyLikeCount {
    pub day: NaiveDate,
    pub post_id: PostId,
    pub count: i64,
}

/// 某一天各帖子的点赞数。序列化为 `{"<post_id>": n, ..., "total": n}`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyLikes {
    per_post: BTreeMap<PostId, i64>,
}

impl DailyLikes {
    pub fn count_for(&self, post_id: PostId) -> i64 {
        self.per_post.get(&post_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> i64 {
        self.per_post.values().sum()
    }
}

impl Serialize for DailyLikes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.per_post.len() + 1))?;
        for (post_id, count) in &self.per_post {
            map.serialize_entry(&post_id.0.to_string(), count)?;
        }
        map.serialize_entry("total", &self.total())?;
        map.end()
    }
}

/// 按天的点赞统计。区间内每一天都有条目，没有点赞的日子只有 `total: 0`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeStats {
    days: BTreeMap<NaiveDate, DailyLikes>,
}

impl LikeStats {
    /// 先铺满区间内所有日期。
    pub fn seeded(range: DateRange) -> Self {
        let days = range.days().map(|day| (day, DailyLikes::default())).collect();
        Self { days }
    }

    /// 铺满日期后叠加实际计数；区间外的行被忽略。
    pub fn collect(range: DateRange, rows: impl IntoIterator<Item = DailyLikeCount>) -> Self {
        let mut stats = Self::seeded(range);
        for row in rows {
            stats.record(row);
        }
        stats
    }

    fn record(&mut self, row: DailyLikeCount) {
        if let Some(day) = self.days.get_mut(&row.day) {
            day.per_post.insert(row.post_id, row.count);
        }
    }

    pub fn day(&self, day: NaiveDate) -> Option<&DailyLikes> {
        self.days.get(&day)
    }

    /// 区间内的天数。
    pub fn day_count(&self) -> usize {
        self.days.len()
    }
}

impl Serialize for LikeStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, likes) in &self.days {
            map.serialize_entry(&day.format("%Y-%m-%d").to_string(), likes)?;
        }
        map.end()
    }
}
