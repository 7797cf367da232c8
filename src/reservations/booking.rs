//! 预订引擎
//!
//! 校验顺序固定 (首个失败即返回)：字段齐全 → 人数 → 桌号 → 时间格式
//! → 非过期 → 无重叠 → 顾客归属。通过后在单个数据库事务内
//! 复查重叠并写入预订 + 归属链接，提交后 best-effort 发送确认通知。

use std::sync::Arc;

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::CurrentUser;
use crate::db::models::{Customer, Reservation, ReservationCreate};
use crate::db::repository::{CustomerRepository, ReservationRepository};
use crate::reservations::availability::{TOTAL_TABLES, overlap_window};
use crate::reservations::clock::Clock;
use crate::services::Notifier;
use crate::utils::time::parse_reservation_datetime;
use crate::utils::validation::validate_range;
use crate::utils::{AppError, AppResult};

/// 单桌最大人数
pub const MAX_PARTY_SIZE: i64 = 20;

/// 创建预订的请求体 (字段名沿用既有外部契约)
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    #[serde(rename = "ReservationDateTime")]
    pub reservation_datetime: Option<String>,
    /// 接受数字或数字字符串
    #[serde(rename = "NumPeople")]
    pub num_people: Option<serde_json::Value>,
    #[serde(rename = "TableNumber")]
    pub table_number: Option<serde_json::Value>,
    #[serde(rename = "CustomerID")]
    pub customer_id: Option<String>,
}

/// JSON 数字或数字字符串 → i64
fn parse_int(value: &serde_json::Value, field: &str) -> AppResult<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| AppError::validation(format!("{field} must be an integer"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::validation(format!("{field} must be an integer"))),
        _ => Err(AppError::validation(format!("{field} must be an integer"))),
    }
}

/// Booking engine — 校验、原子写入、通知
#[derive(Clone)]
pub struct BookingEngine {
    reservations: ReservationRepository,
    customers: CustomerRepository,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl BookingEngine {
    pub fn new(db: Surreal<Db>, clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            reservations: ReservationRepository::new(db.clone()),
            customers: CustomerRepository::new(db),
            clock,
            notifier,
        }
    }

    /// 创建预订，返回预订记录和通知是否送达
    ///
    /// 通知失败绝不导致预订失败 — 只体现在返回的布尔标志上。
    pub async fn create(
        &self,
        req: BookingRequest,
        user: &CurrentUser,
    ) -> AppResult<(Reservation, bool)> {
        // 1. 字段齐全
        let (Some(datetime_raw), Some(num_people_raw), Some(table_raw), Some(customer_id)) = (
            req.reservation_datetime.as_deref(),
            req.num_people.as_ref(),
            req.table_number.as_ref(),
            req.customer_id.as_deref(),
        ) else {
            return Err(AppError::validation("All fields are required"));
        };

        // 2. 人数
        let num_people = parse_int(num_people_raw, "NumPeople")?;
        validate_range(num_people, "NumPeople", 1, MAX_PARTY_SIZE)?;

        // 3. 桌号
        let table_number = parse_int(table_raw, "TableNumber")?;
        validate_range(table_number, "TableNumber", 1, TOTAL_TABLES as i64)?;

        // 4. 时间格式
        let reserved_at = parse_reservation_datetime(datetime_raw)?;

        // 5. 非过期
        let now = self.clock.now();
        if reserved_at < now {
            return Err(AppError::validation(
                "Reservation time cannot be in the past",
            ));
        }

        // 6. 重叠预检查 (只读；事务内还会复查一次)
        let (window_start, window_end) = overlap_window(reserved_at);
        if self
            .reservations
            .has_active_overlap(table_number as i32, window_start, window_end)
            .await?
        {
            return Err(AppError::conflict(
                "This table is not available at the selected time. \
                 Please choose another time or table.",
            ));
        }

        // 7. 顾客存在且属于当前主体 (只能为自己预订)
        let customer = self
            .customers
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer not found"))?;
        if customer.email != user.email {
            return Err(AppError::forbidden(
                "You can only make reservations for yourself",
            ));
        }

        // 原子写入：事务内复查重叠，预订 + 归属链接同生共死
        let customer_rid = customer
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Customer record has no id"))?;
        let reservation = self
            .reservations
            .create_confirmed(
                ReservationCreate {
                    reserved_at_ms: reserved_at.timestamp_millis(),
                    num_people: num_people as i32,
                    table_number: table_number as i32,
                    customer: customer_rid,
                    created_at_ms: now.timestamp_millis(),
                },
                window_start,
                window_end,
            )
            .await?;

        tracing::info!(
            table = table_number,
            reserved_at = %reserved_at,
            customer = %customer.email,
            "Reservation created"
        );

        // 提交后发送确认 — 失败只降级为标志
        let email_sent = self.notify_confirmation(&reservation, &customer).await;

        Ok((reservation, email_sent))
    }

    async fn notify_confirmation(&self, reservation: &Reservation, customer: &Customer) -> bool {
        let sent = self.notifier.send_confirmation(reservation, customer).await;
        if !sent {
            tracing::warn!(
                customer = %customer.email,
                "Confirmation notification failed, reservation stands"
            );
        }
        sent
    }
}
