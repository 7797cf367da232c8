//! 时段生成
//!
//! 营业时间 11:00–23:00，每 30 分钟一个时段，最后入座 22:30。
//! 时段列表与预订状态无关 — 桌台占用由 available-tables 单独查询。

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::utils::{AppError, AppResult};

/// 开门时间
pub const OPENING_TIME: &str = "11:00";
/// 关门时间
pub const CLOSING_TIME: &str = "23:00";
/// 时段间隔 (分钟)
pub const SLOT_MINUTES: i64 = 30;
/// 最后入座时段
pub const LAST_SEATING: &str = "22:30";
/// 当日预订最小提前量 (分钟)
pub const MIN_LEAD_MINUTES: i64 = 30;

/// 生成某日期的可预订时段 ("HH:MM")
///
/// - 未来日期：11:00 到 22:30 (含)，共 24 个时段
/// - 当日：过滤掉距当前时间不足 [`MIN_LEAD_MINUTES`] 的时段
/// - 过去日期：验证错误
pub fn time_slots(date: NaiveDate, now_local: NaiveDateTime) -> AppResult<Vec<String>> {
    let today = now_local.date();
    if date < today {
        return Err(AppError::validation(format!(
            "Date {} is in the past",
            date
        )));
    }

    let opening = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
    let last_seating = NaiveTime::from_hms_opt(22, 30, 0).unwrap();
    let earliest = now_local + Duration::minutes(MIN_LEAD_MINUTES);

    let mut slots = Vec::new();
    let mut slot = opening;
    loop {
        let include = date > today || date.and_time(slot) >= earliest;
        if include {
            slots.push(slot.format("%H:%M").to_string());
        }
        if slot == last_seating {
            break;
        }
        slot += Duration::minutes(SLOT_MINUTES);
    }

    Ok(slots)
}
