//! 时段冲突检测
//!
//! 一天被切分成对齐到 :00/:30 的固定 30 分钟时段。候选时间
//! 视为一个 `[start, start + SLOT_MINUTES)` 的半开窗口。

use chrono::NaiveDate;
use clinic_core::{Appointment, SLOT_MINUTES};
use uuid::Uuid;

/// 在候选时段上查找首个冲突的预约
///
/// 冲突键只有日期 + 时间，诊室不参与判定：同一时刻即使诊室
/// 不同也会被标记为冲突。`exclude_id` 用于编辑场景下豁免
/// 预约自身。检测只针对传入的内存快照，是咨询性质的——
/// 并发写入的最终权威是持久层自身的唯一约束。
pub fn find_conflict<'a>(
    candidate_date: NaiveDate,
    candidate_time_minutes: u16,
    exclude_id: Option<Uuid>,
    pool: &'a [Appointment],
) -> Option<&'a Appointment> {
    let window_start = candidate_time_minutes;
    let window_end = candidate_time_minutes + SLOT_MINUTES;

    pool.iter().find(|appointment| {
        if exclude_id == Some(appointment.id) {
            return false;
        }
        // 按挂钟日期比较，不经过时间戳
        if appointment.date != candidate_date {
            return false;
        }
        appointment.time_minutes >= window_start && appointment.time_minutes < window_end
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clinic_core::{parse_wall_time, wall_date, AppointmentStatus};

    fn appointment_at(date: NaiveDate, time: &str, patient: &str) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            patient_name: patient.to_string(),
            date,
            time_minutes: parse_wall_time(time).unwrap(),
            duration_minutes: SLOT_MINUTES,
            status: AppointmentStatus::Scheduled,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_exact_overlap_is_detected() {
        let date = wall_date(2024, 6, 13).unwrap();
        let pool = vec![appointment_at(date, "10:00", "Maria Souza")];

        let conflict = find_conflict(date, parse_wall_time("10:00").unwrap(), None, &pool);
        assert!(conflict.is_some());
        assert_eq!(conflict.unwrap().patient_name, "Maria Souza");
    }

    #[test]
    fn test_adjacent_slots_do_not_conflict() {
        let date = wall_date(2024, 6, 13).unwrap();
        let pool = vec![appointment_at(date, "10:00", "Maria Souza")];

        // 10:30 是相邻时段，半开窗口 [10:30, 11:00) 不含 10:00
        assert!(find_conflict(date, parse_wall_time("10:30").unwrap(), None, &pool).is_none());
        // 反向相邻同理
        assert!(find_conflict(date, parse_wall_time("09:30").unwrap(), None, &pool).is_none());
    }

    #[test]
    fn test_partial_window_overlap_is_detected() {
        let date = wall_date(2024, 6, 13).unwrap();
        let pool = vec![appointment_at(date, "10:15", "Ana Lima")];

        // 10:15 落在候选窗口 [10:00, 10:30) 内
        let conflict = find_conflict(date, parse_wall_time("10:00").unwrap(), None, &pool);
        assert!(conflict.is_some());
    }

    #[test]
    fn test_self_exclusion() {
        let date = wall_date(2024, 6, 13).unwrap();
        let existing = appointment_at(date, "10:00", "Maria Souza");
        let pool = vec![existing.clone()];

        // 编辑自身时不得与自己冲突
        let conflict = find_conflict(
            date,
            parse_wall_time("10:00").unwrap(),
            Some(existing.id),
            &pool,
        );
        assert!(conflict.is_none());
    }

    #[test]
    fn test_different_days_never_conflict() {
        let pool = vec![appointment_at(
            wall_date(2024, 6, 12).unwrap(),
            "10:00",
            "Maria Souza",
        )];

        let conflict = find_conflict(
            wall_date(2024, 6, 11).unwrap(),
            parse_wall_time("10:00").unwrap(),
            None,
            &pool,
        );
        assert!(conflict.is_none());
    }

    #[test]
    fn test_first_colliding_appointment_wins() {
        let date = wall_date(2024, 6, 13).unwrap();
        let first = appointment_at(date, "10:00", "Maria Souza");
        let second = appointment_at(date, "10:15", "Ana Lima");
        let pool = vec![first.clone(), second];

        let conflict = find_conflict(date, parse_wall_time("10:00").unwrap(), None, &pool);
        assert_eq!(conflict.unwrap().id, first.id);
    }

    #[test]
    fn test_rooms_do_not_discriminate() {
        // 不同诊室、相同时刻仍判为冲突（保留原系统行为）
        let date = wall_date(2024, 6, 13).unwrap();
        let pool = vec![appointment_at(date, "10:00", "Maria Souza")];

        let conflict = find_conflict(date, parse_wall_time("10:00").unwrap(), None, &pool);
        assert!(conflict.is_some());
    }
}
