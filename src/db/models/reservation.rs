//! Reservation Models
//!
//! 预订及其归属链接。预订从不物理删除，取消只做状态流转。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// 预订状态
///
/// 原系统中冗余的 `Confirmed` 布尔字段已折叠进该枚举；
/// 对外契约需要时由 [`Reservation::confirmed`] 派生。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    /// 活跃状态 (占用桌台、参与重叠检测)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

/// Reservation entity (预订)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// 预订时刻，Unix millis UTC
    pub reserved_at_ms: i64,
    /// 人数，[1, 20]
    pub num_people: i32,
    /// 桌号，[1, 20]
    pub table_number: i32,
    pub status: ReservationStatus,
    pub created_at_ms: i64,
}

impl Reservation {
    /// 派生的确认标志 (外部契约字段)
    pub fn confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }
}

/// Reservation ownership link (预订 ↔ 顾客 归属链接)
///
/// 与预订在同一事务中创建，创建后不再更新。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCustomer {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub reservation: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub customer: RecordId,
}

/// Create reservation payload (repository 层)
#[derive(Debug, Clone)]
pub struct ReservationCreate {
    pub reserved_at_ms: i64,
    pub num_people: i32,
    pub table_number: i32,
    pub customer: RecordId,
    pub created_at_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_statuses() {
        assert!(ReservationStatus::Pending.is_active());
        assert!(ReservationStatus::Confirmed.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
    }

    #[test]
    fn test_confirmed_flag_derived_from_status() {
        let mut r = Reservation {
            id: None,
            reserved_at_ms: 0,
            num_people: 2,
            table_number: 5,
            status: ReservationStatus::Confirmed,
            created_at_ms: 0,
        };
        assert!(r.confirmed());

        r.status = ReservationStatus::Cancelled;
        assert!(!r.confirmed());
    }
}
