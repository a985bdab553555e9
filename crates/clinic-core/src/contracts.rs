//! 外部协作方契约
//!
//! 排班核心只依赖这两个 trait：持久化协作方负责存储、软删除
//! 和租户隔离，消息协作方负责向患者投递通知。核心本身不持有
//! 任何共享状态，每次调用都拿到只读快照。

use crate::error::Result;
use crate::models::{Appointment, AppointmentPatch, NewAppointment};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 预约持久化协作方
///
/// 所有查询都以 `clinic_id` 为租户边界。删除是软删除，
/// 被删除的记录不再出现在任何查询结果中。
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// 拉取租户内全部未删除的预约
    async fn fetch_appointments(&self, clinic_id: Uuid) -> Result<Vec<Appointment>>;

    /// 按 ID 查找单条预约
    async fn fetch_appointment(&self, clinic_id: Uuid, id: Uuid) -> Result<Option<Appointment>>;

    /// 创建预约
    async fn create_appointment(&self, data: NewAppointment) -> Result<Appointment>;

    /// 部分更新预约
    async fn update_appointment(
        &self,
        clinic_id: Uuid,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment>;

    /// 软删除预约
    async fn soft_delete_appointment(&self, clinic_id: Uuid, id: Uuid) -> Result<()>;
}

/// 患者消息类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    AppointmentConfirmation, // 预约确认
    AppointmentReminder,     // 就诊提醒
    RescheduleNotice,        // 改期通知
    CancellationNotice,      // 取消通知
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppointmentConfirmation => "appointment_confirmation",
            Self::AppointmentReminder => "appointment_reminder",
            Self::RescheduleNotice => "reschedule_notice",
            Self::CancellationNotice => "cancellation_notice",
        }
    }
}

/// 消息通知协作方
///
/// 投递是异步的；排班流程把它当作 fire-and-forget，
/// 投递失败只记录日志，绝不回灌进排班结果。
#[async_trait]
pub trait AppointmentNotifier: Send + Sync {
    async fn notify(&self, appointment: &Appointment, kind: MessageKind) -> Result<()>;
}
