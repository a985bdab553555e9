//! 数据库模型

use chrono::{DateTime, NaiveDate, Utc};
use clinic_core::{Appointment, AppointmentStatus};
use sqlx::FromRow;
use uuid::Uuid;

// 数据库表模型 - 使用FromRow trait用于SQL查询

/// 数据库预约表
#[derive(Debug, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub room_id: Uuid,
    pub patient_name: String,
    pub date: NaiveDate,
    pub time_minutes: i16,     // SMALLINT，转换为u16
    pub duration_minutes: i16,
    pub status: String,        // 存储为字符串，转换为AppointmentStatus枚举
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<DbAppointment> for Appointment {
    fn from(row: DbAppointment) -> Self {
        Appointment {
            id: row.id,
            clinic_id: row.clinic_id,
            patient_id: row.patient_id,
            professional_id: row.professional_id,
            room_id: row.room_id,
            patient_name: row.patient_name,
            date: row.date,
            time_minutes: row.time_minutes.max(0) as u16,
            duration_minutes: row.duration_minutes.max(0) as u16,
            status: AppointmentStatus::try_from(row.status.as_str())
                .unwrap_or(AppointmentStatus::Scheduled), // 默认状态
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
