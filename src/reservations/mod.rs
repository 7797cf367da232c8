//! 预订领域引擎
//!
//! # 组件
//!
//! - [`clock`] - 注入式时钟抽象
//! - [`slots`] - 30 分钟时段生成 (11:00 – 22:30)
//! - [`availability`] - 桌台占用/可用计算 (±2 小时重叠窗口)
//! - [`booking`] - 预订创建 (校验链 + 事务写入 + 通知)
//! - [`cancel`] - 预订取消 (归属校验 + 单向流转)

pub mod availability;
pub mod booking;
pub mod cancel;
pub mod clock;
pub mod slots;

pub use availability::{AvailabilityEngine, OVERLAP_WINDOW_HOURS, TOTAL_TABLES, overlap_window};
pub use booking::{BookingEngine, BookingRequest, MAX_PARTY_SIZE};
pub use cancel::CancellationEngine;
pub use clock::{Clock, FixedClock, SystemClock};
pub use slots::{CLOSING_TIME, MIN_LEAD_MINUTES, OPENING_TIME, time_slots};
