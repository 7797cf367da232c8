//! 取消引擎
//!
//! 取消是单向状态流转：已取消的预订不能再次取消 (重复调用是错误，
//! 不是静默成功)，也永远不会被重新激活。

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Customer, Reservation, ReservationStatus};
use crate::db::repository::{CustomerRepository, ReservationRepository};
use crate::services::Notifier;
use crate::utils::{AppError, AppResult};

/// Cancellation engine — 归属校验、状态流转、通知
#[derive(Clone)]
pub struct CancellationEngine {
    reservations: ReservationRepository,
    customers: CustomerRepository,
    notifier: Arc<dyn Notifier>,
}

impl CancellationEngine {
    pub fn new(db: Surreal<Db>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            reservations: ReservationRepository::new(db.clone()),
            customers: CustomerRepository::new(db),
            notifier,
        }
    }

    /// 取消预订，返回更新后的记录和通知是否送达
    ///
    /// 调用方只能取消属于自己 (归属链接邮箱匹配) 的预订。
    pub async fn cancel(
        &self,
        reservation_id: &str,
        caller_email: &str,
    ) -> AppResult<(Reservation, bool)> {
        // 1. 预订存在
        let reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Reservation not found"))?;
        let rid = reservation
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Reservation record has no id"))?;

        // 2. 归属链接存在
        let link = self
            .reservations
            .find_owner_link(&rid)
            .await?
            .ok_or_else(|| AppError::not_found("Reservation ownership record not found"))?;

        // 3. 归属顾客邮箱与调用方一致
        let customer = self
            .customers
            .find_by_id(&link.customer.to_string())
            .await?
            .ok_or_else(|| AppError::not_found("Customer not found"))?;
        if customer.email != caller_email {
            return Err(AppError::forbidden(
                "You can only cancel your own reservations",
            ));
        }

        // 4. 不可重复取消
        if reservation.status == ReservationStatus::Cancelled {
            return Err(AppError::conflict("Reservation is already cancelled"));
        }

        // 5. 状态流转
        let updated = self.reservations.set_cancelled(&rid).await?;

        tracing::info!(
            reservation = %rid,
            customer = %customer.email,
            "Reservation cancelled"
        );

        // 取消通知失败不回滚
        let email_sent = self.notify_cancellation(&updated, &customer).await;

        Ok((updated, email_sent))
    }

    async fn notify_cancellation(&self, reservation: &Reservation, customer: &Customer) -> bool {
        let sent = self.notifier.send_cancellation(reservation, customer).await;
        if !sent {
            tracing::warn!(
                customer = %customer.email,
                "Cancellation notification failed, cancellation stands"
            );
        }
        sent
    }
}
