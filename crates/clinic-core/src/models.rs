//! 核心数据模型定义

use crate::error::ClinicError;
use crate::wallclock::{format_wall_time, SLOT_MINUTES};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 预约状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled, // 已预约
    Confirmed, // 已确认
    Completed, // 已完成
    NoShow,    // 爽约
    Canceled,  // 已取消
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
            Self::Canceled => "canceled",
        }
    }
}

impl TryFrom<&str> for AppointmentStatus {
    type Error = ClinicError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "scheduled" => Ok(Self::Scheduled),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "no_show" => Ok(Self::NoShow),
            "canceled" => Ok(Self::Canceled),
            _ => Err(ClinicError::Validation(format!(
                "unknown appointment status: {}",
                value
            ))),
        }
    }
}

/// 预约记录
///
/// `date` 是免时区的挂钟日期，`time_minutes` 是从当天零点起的分钟数。
/// 二者共同构成预约"何时发生"的身份，修改前必须重新做冲突检测。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub clinic_id: Uuid,       // 租户隔离键
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub room_id: Uuid,
    pub patient_name: String,  // 冗余存储，用于冲突提示
    pub date: NaiveDate,
    pub time_minutes: u16,
    pub duration_minutes: u16,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// 是否仍占用时段（已取消的预约不阻塞新的预约）
    pub fn occupies_slot(&self) -> bool {
        !matches!(self.status, AppointmentStatus::Canceled)
    }

    /// "HH:MM" 形式的开始时间
    pub fn time_label(&self) -> String {
        format_wall_time(self.time_minutes)
    }

    /// 就地套用部分更新
    pub fn apply_patch(&mut self, patch: &AppointmentPatch, now: DateTime<Utc>) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time_minutes) = patch.time_minutes {
            self.time_minutes = time_minutes;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(professional_id) = patch.professional_id {
            self.professional_id = professional_id;
        }
        if let Some(room_id) = patch.room_id {
            self.room_id = room_id;
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        self.updated_at = now;
    }
}

/// 新建预约的数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub room_id: Uuid,
    pub patient_name: String,
    pub date: NaiveDate,
    pub time_minutes: u16,
    pub notes: Option<String>,
}

impl NewAppointment {
    /// 以默认时段长度物化为一条预约记录
    pub fn into_appointment(self, id: Uuid, now: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            clinic_id: self.clinic_id,
            patient_id: self.patient_id,
            professional_id: self.professional_id,
            room_id: self.room_id,
            patient_name: self.patient_name,
            date: self.date,
            time_minutes: self.time_minutes,
            duration_minutes: SLOT_MINUTES,
            status: AppointmentStatus::Scheduled,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 预约部分更新
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentPatch {
    pub date: Option<NaiveDate>,
    pub time_minutes: Option<u16>,
    pub status: Option<AppointmentStatus>,
    pub professional_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl AppointmentPatch {
    /// 更新是否改动了日期或时间（改动则必须重新做冲突检测）
    pub fn touches_schedule(&self) -> bool {
        self.date.is_some() || self.time_minutes.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time_minutes.is_none()
            && self.status.is_none()
            && self.professional_id.is_none()
            && self.room_id.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallclock::wall_date;

    fn sample_appointment(status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            patient_name: "Maria Souza".to_string(),
            date: wall_date(2024, 6, 13).unwrap(),
            time_minutes: 600,
            duration_minutes: SLOT_MINUTES,
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::NoShow,
            AppointmentStatus::Canceled,
        ] {
            assert_eq!(AppointmentStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(AppointmentStatus::try_from("rescheduled").is_err());
    }

    #[test]
    fn test_canceled_does_not_occupy_slot() {
        assert!(sample_appointment(AppointmentStatus::Scheduled).occupies_slot());
        assert!(sample_appointment(AppointmentStatus::Confirmed).occupies_slot());
        assert!(!sample_appointment(AppointmentStatus::Canceled).occupies_slot());
    }

    #[test]
    fn test_patch_touches_schedule() {
        let mut patch = AppointmentPatch::default();
        assert!(patch.is_empty());
        assert!(!patch.touches_schedule());

        patch.status = Some(AppointmentStatus::Confirmed);
        assert!(!patch.touches_schedule());

        patch.time_minutes = Some(630);
        assert!(patch.touches_schedule());
    }
}
