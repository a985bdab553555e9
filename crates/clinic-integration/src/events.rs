//! 排班事件
//!
//! 预约生命周期里对外可见的事件封装，供日志、审计和
//! 失效信号复用。

use chrono::{DateTime, Utc};
use clinic_core::{Appointment, ClinicError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 排班事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEventKind {
    AppointmentCreated,
    AppointmentRescheduled,
    AppointmentCanceled,
    AppointmentStatusChanged,
}

impl ScheduleEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppointmentCreated => "appointment.created",
            Self::AppointmentRescheduled => "appointment.rescheduled",
            Self::AppointmentCanceled => "appointment.canceled",
            Self::AppointmentStatusChanged => "appointment.status_changed",
        }
    }
}

impl TryFrom<&str> for ScheduleEventKind {
    type Error = ClinicError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "appointment.created" => Ok(Self::AppointmentCreated),
            "appointment.rescheduled" => Ok(Self::AppointmentRescheduled),
            "appointment.canceled" => Ok(Self::AppointmentCanceled),
            "appointment.status_changed" => Ok(Self::AppointmentStatusChanged),
            _ => Err(ClinicError::Validation(format!(
                "unknown event kind: {}",
                value
            ))),
        }
    }
}

/// 排班事件数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: String,
    pub kind: ScheduleEventKind,
    pub clinic_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
    pub source: String,
}

impl ScheduleEvent {
    pub fn new(kind: ScheduleEventKind, clinic_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            clinic_id,
            timestamp: Utc::now(),
            data,
            source: "clinic".to_string(),
        }
    }

    /// 由预约记录构造事件，预约本体作为事件数据
    pub fn for_appointment(kind: ScheduleEventKind, appointment: &Appointment) -> Result<Self> {
        let data = serde_json::to_value(appointment)?;
        Ok(Self::new(kind, appointment.clinic_id, data))
    }
}
