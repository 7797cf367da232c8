//! 桌台可用性引擎
//!
//! 固定 20 张桌台；一个时刻的占用集合 = 该时刻 ±2 小时窗口内
//! 存在活跃 (Pending/Confirmed) 预订的桌号。

use chrono::{DateTime, Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::ReservationRepository;
use crate::utils::AppResult;

/// 餐厅桌台总数，桌号 1..=20
pub const TOTAL_TABLES: i32 = 20;
/// 重叠检测窗口 (小时，±)
pub const OVERLAP_WINDOW_HOURS: i64 = 2;

/// 某时刻的重叠检测窗口 [instant − 2h, instant + 2h]，Unix millis (闭区间)
pub fn overlap_window(instant: DateTime<Utc>) -> (i64, i64) {
    let half = Duration::hours(OVERLAP_WINDOW_HOURS);
    (
        (instant - half).timestamp_millis(),
        (instant + half).timestamp_millis(),
    )
}

/// Availability engine — 只读查询，无副作用
#[derive(Clone)]
pub struct AvailabilityEngine {
    repo: ReservationRepository,
}

impl AvailabilityEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: ReservationRepository::new(db),
        }
    }

    /// 该时刻被占用的桌号 (去重、升序)
    pub async fn occupied_tables(&self, instant: DateTime<Utc>) -> AppResult<Vec<i32>> {
        let (start, end) = overlap_window(instant);
        Ok(self.repo.find_occupied_tables(start, end).await?)
    }

    /// 该时刻可用的桌号：1..=20 去掉占用集合，升序
    pub async fn available_tables(&self, instant: DateTime<Utc>) -> AppResult<Vec<i32>> {
        let occupied = self.occupied_tables(instant).await?;
        Ok((1..=TOTAL_TABLES)
            .filter(|t| !occupied.contains(t))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_overlap_window_is_symmetric() {
        let instant = Utc.with_ymd_and_hms(2099, 1, 1, 18, 0, 0).unwrap();
        let (start, end) = overlap_window(instant);

        let two_hours_ms = 2 * 60 * 60 * 1000;
        assert_eq!(instant.timestamp_millis() - start, two_hours_ms);
        assert_eq!(end - instant.timestamp_millis(), two_hours_ms);
    }
}
