//! 考勤状态计算
//!
//! 所有“有效状态”都从这里算出：今日名单、看板、未打卡拆分共用同一套函数。

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::AttendanceStatus;
use crate::utils::date::parse_hhmm;

// 有效状态 = 落库状态 + 未打卡的推断状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub enum EffectiveStatus {
    Present,
    Late,
    Absent,
    Excused,
    /// 课程尚未开始
    PendingEarly,
    /// 课程已开始但未到缺勤判定时刻
    PendingLate,
}

impl From<AttendanceStatus> for EffectiveStatus {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => EffectiveStatus::Present,
            AttendanceStatus::Late => EffectiveStatus::Late,
            AttendanceStatus::Absent => EffectiveStatus::Absent,
            AttendanceStatus::Excused => EffectiveStatus::Excused,
        }
    }
}

/// 计算单个学生的有效状态
///
/// 1. 已有落库状态 -> 原样返回
/// 2. 班级无开始时间 -> pending_early
/// 3. now < 开始 -> pending_early
/// 4. now < 开始 + 缺勤截止 -> pending_late
/// 5. 否则 -> absent
pub fn compute_effective_status(
    db_status: Option<AttendanceStatus>,
    class_start_time: Option<&str>,
    absence_cutoff_minutes: i64,
    now_minutes: i64,
) -> EffectiveStatus {
    if let Some(status) = db_status {
        return status.into();
    }

    let Some(start) = class_start_time.and_then(parse_hhmm) else {
        return EffectiveStatus::PendingEarly;
    };

    if now_minutes < start {
        return EffectiveStatus::PendingEarly;
    }
    if now_minutes < start + absence_cutoff_minutes {
        return EffectiveStatus::PendingLate;
    }
    EffectiveStatus::Absent
}

/// 出勤率 = round((present + late) / total * 100)
pub fn attendance_percent(present: i64, late: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (((present + late) as f64 / total as f64) * 100.0).round() as i64
}

/// 未打卡拆分的班级输入
#[derive(Debug, Clone)]
pub struct ClassSchedule {
    pub class_id: i64,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// 未打卡人数按班级拆分为 pending_early / pending_late / absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct NoScanSplit {
    pub pending_early: i64,
    pub pending_late: i64,
    pub absent: i64,
}

pub fn split_no_scan_counts(
    classes: &[ClassSchedule],
    class_student_counts: &std::collections::HashMap<i64, i64>,
    class_attendance_counts: &std::collections::HashMap<i64, i64>,
    absence_cutoff_minutes: i64,
    now_minutes: i64,
) -> NoScanSplit {
    let mut split = NoScanSplit::default();

    for class in classes {
        let total = class_student_counts
            .get(&class.class_id)
            .copied()
            .unwrap_or(0);
        let attended = class_attendance_counts
            .get(&class.class_id)
            .copied()
            .unwrap_or(0);
        let not_arrived = (total - attended).max(0);
        if not_arrived == 0 {
            continue;
        }

        let Some(start) = class.start_time.as_deref().and_then(parse_hhmm) else {
            split.pending_early += not_arrived;
            continue;
        };

        if now_minutes < start {
            split.pending_early += not_arrived;
        } else if now_minutes < start + absence_cutoff_minutes {
            split.pending_late += not_arrived;
        } else {
            split.absent += not_arrived;
        }
    }

    split
}

/// 当前正在上课的班级（开始 <= now < max(课表结束, 开始+缺勤截止)）
pub fn active_class_ids(
    classes: &[ClassSchedule],
    now_minutes: i64,
    absence_cutoff_minutes: i64,
) -> Vec<i64> {
    classes
        .iter()
        .filter_map(|class| {
            let start = class.start_time.as_deref().and_then(parse_hhmm)?;
            let end_from_schedule = class
                .end_time
                .as_deref()
                .and_then(parse_hhmm)
                .unwrap_or(start);
            let end = end_from_schedule.max(start + absence_cutoff_minutes);
            (now_minutes >= start && now_minutes < end).then_some(class.class_id)
        })
        .collect()
}

/// 已经开始上课的班级（无开始时间视为已开始）
pub fn started_class_ids(classes: &[ClassSchedule], now_minutes: i64) -> Vec<i64> {
    classes
        .iter()
        .filter_map(|class| match class.start_time.as_deref().and_then(parse_hhmm) {
            None => Some(class.class_id),
            Some(start) if now_minutes >= start => Some(class.class_id),
            Some(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn db_status_wins() {
        let status = compute_effective_status(
            Some(AttendanceStatus::Excused),
            Some("08:00"),
            30,
            23 * 60, // 即便早已过了截止时刻
        );
        assert_eq!(status, EffectiveStatus::Excused);
    }

    #[test]
    fn no_start_time_is_pending_early() {
        let status = compute_effective_status(None, None, 30, 600);
        assert_eq!(status, EffectiveStatus::PendingEarly);
    }

    #[test]
    fn before_class_start() {
        let status = compute_effective_status(None, Some("08:30"), 30, 8 * 60);
        assert_eq!(status, EffectiveStatus::PendingEarly);
    }

    #[test]
    fn within_cutoff_window() {
        let status = compute_effective_status(None, Some("08:00"), 30, 8 * 60 + 15);
        assert_eq!(status, EffectiveStatus::PendingLate);
    }

    #[test]
    fn after_cutoff_is_absent() {
        let status = compute_effective_status(None, Some("08:00"), 30, 8 * 60 + 30);
        assert_eq!(status, EffectiveStatus::Absent);
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(attendance_percent(2, 1, 4), 75);
        assert_eq!(attendance_percent(1, 0, 3), 33);
        assert_eq!(attendance_percent(2, 0, 3), 67);
        assert_eq!(attendance_percent(0, 0, 0), 0);
    }

    fn schedules() -> Vec<ClassSchedule> {
        vec![
            ClassSchedule {
                class_id: 1,
                start_time: Some("08:00".to_string()),
                end_time: Some("12:00".to_string()),
            },
            ClassSchedule {
                class_id: 2,
                start_time: Some("09:00".to_string()),
                end_time: None,
            },
            ClassSchedule {
                class_id: 3,
                start_time: None,
                end_time: None,
            },
        ]
    }

    #[test]
    fn no_scan_split_by_class() {
        let totals = HashMap::from([(1, 10), (2, 10), (3, 5)]);
        let attended = HashMap::from([(1, 8)]);
        // 08:45：一班已过 30 分钟截止，二班未开始、全员未刷卡
        let split = split_no_scan_counts(&schedules(), &totals, &attended, 30, 8 * 60 + 45);
        assert_eq!(
            split,
            NoScanSplit {
                pending_early: 15, // 二班 10 + 无课表 5
                pending_late: 0,
                absent: 2,
            }
        );
    }

    #[test]
    fn active_classes_respect_cutoff_floor() {
        // 二班无结束时间 -> 活跃窗口为开始 + 缺勤截止
        let active = active_class_ids(&schedules(), 9 * 60 + 15, 30);
        assert_eq!(active, vec![1, 2]);
        let active = active_class_ids(&schedules(), 9 * 60 + 45, 30);
        assert_eq!(active, vec![1]);
    }

    #[test]
    fn started_classes() {
        let started = started_class_ids(&schedules(), 8 * 60 + 30);
        assert_eq!(started, vec![1, 3]);
        let started = started_class_ids(&schedules(), 10 * 60);
        assert_eq!(started, vec![1, 2, 3]);
    }
}
