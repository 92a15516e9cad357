//! 学校时区的日期/时间工具
//!
//! 考勤状态判定依赖学校所在时区的"本地分钟数"，这里统一处理时区换算。

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::errors::{AttendanceError, Result};

/// 解析 IANA 时区字符串，失败时返回配置错误
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse::<Tz>()
        .map_err(|_| AttendanceError::validation(format!("Invalid timezone: {tz}")))
}

/// 获取某时刻在指定时区的"午夜起分钟数"
pub fn minutes_in_zone(at: DateTime<Utc>, tz: Tz) -> i64 {
    let local = at.with_timezone(&tz);
    (local.hour() * 60 + local.minute()) as i64
}

/// 获取某时刻在指定时区的日期（YYYY-MM-DD）
pub fn date_only_in_zone(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y-%m-%d").to_string()
}

/// 解析 "HH:MM" 为午夜起分钟数
pub fn parse_hhmm(value: &str) -> Option<i64> {
    let (h, m) = value.split_once(':')?;
    let h: i64 = h.trim().parse().ok()?;
    let m: i64 = m.trim().parse().ok()?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        return None;
    }
    Some(h * 60 + m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("08:30"), Some(510));
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("08:60"), None);
        assert_eq!(parse_hhmm("0830"), None);
    }

    #[test]
    fn test_minutes_in_zone() {
        let tz = parse_timezone("Asia/Tashkent").unwrap();
        // 03:00 UTC = 08:00 Tashkent (UTC+5)
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 3, 0, 0).unwrap();
        assert_eq!(minutes_in_zone(at, tz), 8 * 60);
    }

    #[test]
    fn test_date_only_in_zone() {
        let tz = parse_timezone("Asia/Tashkent").unwrap();
        // 21:00 UTC 已是塔什干的次日
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 21, 0, 0).unwrap();
        assert_eq!(date_only_in_zone(at, tz), "2026-03-03");
    }

    #[test]
    fn test_parse_timezone_invalid() {
        assert!(parse_timezone("Not/AZone").is_err());
    }
}
