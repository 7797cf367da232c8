//! 邮件通知服务
//!
//! 通过 HTTP 邮件中继 (JSON POST) 发送预订确认/取消通知。
//! 通知是 best-effort 副作用：任何失败都只记日志并返回 `false`，
//! 绝不向调用方传播错误。

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;

use crate::db::models::{Customer, Reservation};
use crate::utils::time::millis_to_utc;

/// 发送超时 — 通知不允许长时间阻塞请求尾部
const SEND_TIMEOUT_SECS: u64 = 5;

/// Notification capability consumed by the booking/cancellation engines
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 预订确认通知，返回是否送达
    async fn send_confirmation(&self, reservation: &Reservation, customer: &Customer) -> bool;

    /// 预订取消通知，返回是否送达
    async fn send_cancellation(&self, reservation: &Reservation, customer: &Customer) -> bool;
}

#[derive(Debug, Serialize)]
struct MailPayload {
    from: String,
    to: String,
    subject: String,
    text: String,
}

/// HTTP 邮件中继客户端
///
/// `MAIL_API_URL` 未配置时为关闭状态：跳过发送、返回 `false`。
#[derive(Debug, Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_url: Option<String>,
    from: String,
    restaurant_name: String,
}

impl Mailer {
    pub fn new(api_url: Option<String>, from: String, restaurant_name: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url,
            from,
            restaurant_name,
        }
    }

    async fn send(&self, to: &str, subject: String, text: String) -> bool {
        let Some(url) = self.api_url.as_deref() else {
            tracing::info!(to = %to, "Mail relay not configured, skipping notification");
            return false;
        };

        let payload = MailPayload {
            from: self.from.clone(),
            to: to.to_string(),
            subject,
            text,
        };

        match self.client.post(url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!(to = %to, status = %resp.status(), "Mail relay rejected message");
                false
            }
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "Failed to reach mail relay");
                false
            }
        }
    }

    fn format_when(reservation: &Reservation) -> String {
        millis_to_utc(reservation.reserved_at_ms)
            .with_timezone(&Local)
            .format("%B %d, %Y at %H:%M")
            .to_string()
    }
}

#[async_trait]
impl Notifier for Mailer {
    async fn send_confirmation(&self, reservation: &Reservation, customer: &Customer) -> bool {
        let subject = format!("Reservation Confirmation - {}", self.restaurant_name);
        let text = format!(
            "Dear {},\n\nYour reservation at {} is confirmed.\n\n\
             Date & time: {}\nTable: {}\nGuests: {}\n\nSee you soon!",
            customer.full_name(),
            self.restaurant_name,
            Self::format_when(reservation),
            reservation.table_number,
            reservation.num_people,
        );
        self.send(&customer.email, subject, text).await
    }

    async fn send_cancellation(&self, reservation: &Reservation, customer: &Customer) -> bool {
        let subject = format!("Reservation Cancelled - {}", self.restaurant_name);
        let text = format!(
            "Dear {},\n\nYour reservation at {} for {} (table {}) has been cancelled.\n\n\
             We hope to see you another time.",
            customer.full_name(),
            self.restaurant_name,
            Self::format_when(reservation),
            reservation.table_number,
        );
        self.send(&customer.email, subject, text).await
    }
}
