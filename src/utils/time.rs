//! 时间工具函数 — 解析与时区转换
//!
//! 所有日期→时间戳转换统一在 API handler / 引擎层完成，
//! repository 层只接收 `i64` Unix millis (UTC)。
//!
//! 无时区限定的时间戳按服务器本地时区 (营业时区) 解释。

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析时间字符串 (HH:MM)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// 解析预订时间戳
///
/// 接受两种表示：
/// - RFC 3339 带时区 (`2099-01-01T18:00:00Z`, `2099-01-01T18:00:00+01:00`)
/// - 无时区的本地时间 (`2099-01-01T18:00`, `2099-01-01 18:00:00`)，
///   按服务器本地时区解释
pub fn parse_reservation_datetime(value: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(local_to_utc(naive));
        }
    }

    Err(AppError::validation(format!(
        "Invalid datetime format: {}",
        value
    )))
}

/// 本地 (营业时区) 时间 → UTC
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    naive
        .and_local_timezone(Local)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Unix millis → UTC datetime (越界按 epoch 处理)
pub fn millis_to_utc(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2099-01-01").is_ok());
        assert!(parse_date("2099-13-01").is_err());
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("18:30").unwrap(),
            NaiveTime::from_hms_opt(18, 30, 0).unwrap()
        );
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("18").is_err());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_reservation_datetime("2099-01-01T18:00:00Z").unwrap();
        assert_eq!(dt.hour(), 18);

        let dt = parse_reservation_datetime("2099-01-01T18:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 16);
    }

    #[test]
    fn test_parse_naive_assigned_local_timezone() {
        let parsed = parse_reservation_datetime("2099-01-01T18:00").unwrap();
        let expected = local_to_utc(
            NaiveDate::from_ymd_opt(2099, 1, 1)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
        );
        assert_eq!(parsed, expected);

        // 带秒、空格分隔的变体同样接受
        assert!(parse_reservation_datetime("2099-01-01 18:00:00").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_reservation_datetime("tomorrow at noon").is_err());
        assert!(parse_reservation_datetime("2099-01-01").is_err());
    }

    #[test]
    fn test_millis_round_trip() {
        let dt = parse_reservation_datetime("2099-01-01T18:00:00Z").unwrap();
        assert_eq!(millis_to_utc(dt.timestamp_millis()), dt);
    }
}
