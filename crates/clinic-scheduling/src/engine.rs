//! 排班编排引擎
//!
//! 把冲突检测排在每一次落库之前：新建和改期都先对注入的
//! 快照做检查（Requested → Checking → Accepted | Rejected），
//! 通过才转发给持久化协作方。检查是单次同步的，没有重试
//! 循环；调用方换一个时间后可以重新发起。

use crate::lifecycle::{StatusEvent, StatusStateMachine};
use clinic_agenda::find_conflict;
use clinic_core::{
    Appointment, AppointmentNotifier, AppointmentPatch, AppointmentStatus, AppointmentStore,
    ClinicError, MessageKind, NewAppointment, Result, SLOT_MINUTES,
};
use std::sync::Arc;
use uuid::Uuid;

/// 冲突检查后的排班结论
#[derive(Debug, Clone)]
pub enum ScheduleDecision {
    /// 无冲突，变更已落库
    Accepted(Appointment),
    /// 候选时段已被占用，未发起任何持久化调用
    Rejected { conflict: Appointment },
}

impl ScheduleDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// 把拒绝结论转成对外的时段冲突错误
    pub fn into_result(self) -> Result<Appointment> {
        match self {
            Self::Accepted(appointment) => Ok(appointment),
            Self::Rejected { conflict } => Err(slot_conflict_error(&conflict)),
        }
    }
}

fn slot_conflict_error(conflict: &Appointment) -> ClinicError {
    ClinicError::SlotConflict {
        patient: conflict.patient_name.clone(),
        date: conflict.date.to_string(),
        time: conflict.time_label(),
    }
}

/// 排班引擎
///
/// 组合状态机、冲突检测和外部协作方，提供统一的排班入口。
/// 引擎自身无状态，预约数据每次都从持久化协作方取最新快照。
pub struct SchedulingEngine {
    store: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn AppointmentNotifier>,
    state_machine: StatusStateMachine,
}

impl SchedulingEngine {
    /// 创建新的排班引擎
    pub fn new(store: Arc<dyn AppointmentStore>, notifier: Arc<dyn AppointmentNotifier>) -> Self {
        Self {
            store,
            notifier,
            state_machine: StatusStateMachine::new(),
        }
    }

    /// 新建预约
    ///
    /// 与改期走同一套检查纪律：先冲突检查，通过才创建。
    pub async fn book_appointment(&self, data: NewAppointment) -> Result<ScheduleDecision> {
        tracing::info!(
            "Booking appointment for patient {} at {} {}",
            data.patient_id,
            data.date,
            clinic_core::format_wall_time(data.time_minutes)
        );

        validate_slot_time(data.time_minutes)?;
        if data.patient_name.trim().is_empty() {
            return Err(ClinicError::Validation(
                "patient name must not be empty".to_string(),
            ));
        }

        // 1. 取占用快照（已取消的预约不阻塞时段）
        let snapshot = self.occupied_snapshot(data.clinic_id).await?;

        // 2. 冲突检查
        if let Some(conflict) = find_conflict(data.date, data.time_minutes, None, &snapshot) {
            tracing::warn!(
                "Slot conflict for clinic {} at {} {}: taken by appointment {}",
                data.clinic_id,
                data.date,
                clinic_core::format_wall_time(data.time_minutes),
                conflict.id
            );
            return Ok(ScheduleDecision::Rejected {
                conflict: conflict.clone(),
            });
        }

        // 3. 落库并通知患者
        let appointment = self.store.create_appointment(data).await?;
        self.dispatch_notification(appointment.clone(), MessageKind::AppointmentConfirmation);

        tracing::info!("Appointment {} booked", appointment.id);
        Ok(ScheduleDecision::Accepted(appointment))
    }

    /// 改期/更新预约
    ///
    /// 补丁改动了日期或时间时必须重新做冲突检测（豁免预约
    /// 自身）；补丁携带目标状态时先过状态机校验。
    pub async fn request_reschedule(
        &self,
        clinic_id: Uuid,
        appointment_id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<ScheduleDecision> {
        tracing::info!("Reschedule requested for appointment {}", appointment_id);

        if patch.is_empty() {
            return Err(ClinicError::Validation("empty appointment patch".to_string()));
        }

        let current = self
            .store
            .fetch_appointment(clinic_id, appointment_id)
            .await?
            .ok_or_else(|| {
                ClinicError::NotFound(format!("appointment {} not found", appointment_id))
            })?;

        // 1. 状态补丁先过状态机
        if let Some(target) = patch.status {
            if target != current.status
                && self.state_machine.event_for(current.status, target).is_none()
            {
                return Err(ClinicError::InvalidStatusTransition {
                    from: current.status.as_str().to_string(),
                    event: target.as_str().to_string(),
                });
            }
        }

        // 2. Checking：改动了日期/时间才重新做冲突检测
        if patch.touches_schedule() {
            let candidate_date = patch.date.unwrap_or(current.date);
            let candidate_time = patch.time_minutes.unwrap_or(current.time_minutes);
            validate_slot_time(candidate_time)?;

            let snapshot = self.occupied_snapshot(clinic_id).await?;
            if let Some(conflict) =
                find_conflict(candidate_date, candidate_time, Some(appointment_id), &snapshot)
            {
                tracing::warn!(
                    "Reschedule of {} rejected: slot taken by appointment {}",
                    appointment_id,
                    conflict.id
                );
                return Ok(ScheduleDecision::Rejected {
                    conflict: conflict.clone(),
                });
            }
        }

        // 3. Accepted：转发给持久化协作方
        let rescheduled = patch.touches_schedule();
        let canceled = patch.status == Some(AppointmentStatus::Canceled);
        let updated = self
            .store
            .update_appointment(clinic_id, appointment_id, patch)
            .await?;

        if rescheduled {
            self.dispatch_notification(updated.clone(), MessageKind::RescheduleNotice);
        } else if canceled {
            self.dispatch_notification(updated.clone(), MessageKind::CancellationNotice);
        }

        tracing::info!("Appointment {} updated", appointment_id);
        Ok(ScheduleDecision::Accepted(updated))
    }

    /// 按事件推进预约状态
    ///
    /// Reopen 会重新做冲突检测：取消期间时段可能已被占用。
    pub async fn change_status(
        &self,
        clinic_id: Uuid,
        appointment_id: Uuid,
        event: StatusEvent,
    ) -> Result<Appointment> {
        let current = self
            .store
            .fetch_appointment(clinic_id, appointment_id)
            .await?
            .ok_or_else(|| {
                ClinicError::NotFound(format!("appointment {} not found", appointment_id))
            })?;

        let new_status = self.state_machine.transition(current.status, event)?;

        if event == StatusEvent::Reopen {
            let snapshot = self.occupied_snapshot(clinic_id).await?;
            if let Some(conflict) = find_conflict(
                current.date,
                current.time_minutes,
                Some(appointment_id),
                &snapshot,
            ) {
                return Err(slot_conflict_error(conflict));
            }
        }

        let patch = AppointmentPatch {
            status: Some(new_status),
            ..Default::default()
        };
        let updated = self
            .store
            .update_appointment(clinic_id, appointment_id, patch)
            .await?;

        if new_status == AppointmentStatus::Canceled {
            self.dispatch_notification(updated.clone(), MessageKind::CancellationNotice);
        }

        tracing::info!(
            "Appointment {} status changed from {} to {}",
            appointment_id,
            current.status.as_str(),
            new_status.as_str()
        );
        Ok(updated)
    }

    /// 取消预约
    pub async fn cancel_appointment(
        &self,
        clinic_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Appointment> {
        self.change_status(clinic_id, appointment_id, StatusEvent::Cancel)
            .await
    }

    /// 获取状态机实例
    pub fn state_machine(&self) -> &StatusStateMachine {
        &self.state_machine
    }

    /// 取租户内仍占用时段的预约快照
    async fn occupied_snapshot(&self, clinic_id: Uuid) -> Result<Vec<Appointment>> {
        let mut appointments = self.store.fetch_appointments(clinic_id).await?;
        appointments.retain(Appointment::occupies_slot);
        Ok(appointments)
    }

    /// 投递患者消息，失败只记日志
    fn dispatch_notification(&self, appointment: Appointment, kind: MessageKind) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&appointment, kind).await {
                tracing::warn!(
                    "Failed to deliver {} message for appointment {}: {}",
                    kind.as_str(),
                    appointment.id,
                    e
                );
            }
        });
    }
}

/// 候选时间必须对齐 30 分钟时段边界
fn validate_slot_time(time_minutes: u16) -> Result<()> {
    if time_minutes >= 24 * 60 || time_minutes % SLOT_MINUTES != 0 {
        return Err(ClinicError::Validation(format!(
            "time must be aligned to {}-minute slots: got minute {}",
            SLOT_MINUTES, time_minutes
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clinic_core::{parse_wall_time, wall_date};
    use clinic_database::MemoryAppointmentStore;

    struct NoopNotifier;

    #[async_trait]
    impl AppointmentNotifier for NoopNotifier {
        async fn notify(&self, _appointment: &Appointment, _kind: MessageKind) -> Result<()> {
            Ok(())
        }
    }

    fn engine() -> (SchedulingEngine, Arc<MemoryAppointmentStore>) {
        let store = Arc::new(MemoryAppointmentStore::new());
        let engine = SchedulingEngine::new(store.clone(), Arc::new(NoopNotifier));
        (engine, store)
    }

    fn new_appointment(clinic_id: Uuid, day: u32, time: &str, patient: &str) -> NewAppointment {
        NewAppointment {
            clinic_id,
            patient_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            patient_name: patient.to_string(),
            date: wall_date(2024, 6, day).unwrap(),
            time_minutes: parse_wall_time(time).unwrap(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_booking_free_slot_is_accepted() {
        let (engine, _) = engine();
        let clinic_id = Uuid::new_v4();

        let decision = engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Maria Souza"))
            .await
            .unwrap();

        let appointment = decision.into_result().unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.time_minutes, 600);
    }

    #[tokio::test]
    async fn test_booking_taken_slot_is_rejected() {
        let (engine, _) = engine();
        let clinic_id = Uuid::new_v4();

        engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Maria Souza"))
            .await
            .unwrap();

        let decision = engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Ana Lima"))
            .await
            .unwrap();

        match decision {
            ScheduleDecision::Rejected { conflict } => {
                assert_eq!(conflict.patient_name, "Maria Souza");
            }
            ScheduleDecision::Accepted(_) => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_adjacent_slot_booking_is_accepted() {
        let (engine, _) = engine();
        let clinic_id = Uuid::new_v4();

        engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Maria Souza"))
            .await
            .unwrap();

        let decision = engine
            .book_appointment(new_appointment(clinic_id, 13, "10:30", "Ana Lima"))
            .await
            .unwrap();
        assert!(decision.is_accepted());
    }

    #[tokio::test]
    async fn test_unaligned_time_is_rejected_up_front() {
        let (engine, _) = engine();
        let mut data = new_appointment(Uuid::new_v4(), 13, "10:00", "Maria Souza");
        data.time_minutes = 610;

        assert!(matches!(
            engine.book_appointment(data).await,
            Err(ClinicError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_canceled_appointment_does_not_block_slot() {
        let (engine, _) = engine();
        let clinic_id = Uuid::new_v4();

        let first = engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Maria Souza"))
            .await
            .unwrap()
            .into_result()
            .unwrap();
        engine.cancel_appointment(clinic_id, first.id).await.unwrap();

        let decision = engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Ana Lima"))
            .await
            .unwrap();
        assert!(decision.is_accepted());
    }

    #[tokio::test]
    async fn test_reschedule_to_free_slot_is_accepted() {
        let (engine, _) = engine();
        let clinic_id = Uuid::new_v4();

        let appointment = engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Maria Souza"))
            .await
            .unwrap()
            .into_result()
            .unwrap();

        let patch = AppointmentPatch {
            time_minutes: Some(parse_wall_time("14:00").unwrap()),
            ..Default::default()
        };
        let updated = engine
            .request_reschedule(clinic_id, appointment.id, patch)
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(updated.time_minutes, parse_wall_time("14:00").unwrap());
    }

    #[tokio::test]
    async fn test_reschedule_onto_taken_slot_is_rejected() {
        let (engine, _) = engine();
        let clinic_id = Uuid::new_v4();

        engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Maria Souza"))
            .await
            .unwrap();
        let second = engine
            .book_appointment(new_appointment(clinic_id, 13, "11:00", "Ana Lima"))
            .await
            .unwrap()
            .into_result()
            .unwrap();

        let patch = AppointmentPatch {
            time_minutes: Some(parse_wall_time("10:00").unwrap()),
            ..Default::default()
        };
        let decision = engine
            .request_reschedule(clinic_id, second.id, patch)
            .await
            .unwrap();

        match decision.into_result() {
            Err(ClinicError::SlotConflict { patient, .. }) => {
                assert_eq!(patient, "Maria Souza");
            }
            other => panic!("expected slot conflict, got {:?}", other.map(|a| a.id)),
        }
    }

    #[tokio::test]
    async fn test_reschedule_same_slot_excludes_self() {
        let (engine, _) = engine();
        let clinic_id = Uuid::new_v4();

        let appointment = engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Maria Souza"))
            .await
            .unwrap()
            .into_result()
            .unwrap();

        // 原地保存：日期时间未变，不得和自己冲突
        let patch = AppointmentPatch {
            date: Some(appointment.date),
            time_minutes: Some(appointment.time_minutes),
            ..Default::default()
        };
        let decision = engine
            .request_reschedule(clinic_id, appointment.id, patch)
            .await
            .unwrap();
        assert!(decision.is_accepted());
    }

    #[tokio::test]
    async fn test_status_patch_must_follow_state_machine() {
        let (engine, _) = engine();
        let clinic_id = Uuid::new_v4();

        let appointment = engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Maria Souza"))
            .await
            .unwrap()
            .into_result()
            .unwrap();

        // scheduled → completed 不经确认，非法
        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Completed),
            ..Default::default()
        };
        assert!(matches!(
            engine.request_reschedule(clinic_id, appointment.id, patch).await,
            Err(ClinicError::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_reopen_into_taken_slot_fails() {
        let (engine, _) = engine();
        let clinic_id = Uuid::new_v4();

        let first = engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Maria Souza"))
            .await
            .unwrap()
            .into_result()
            .unwrap();
        engine.cancel_appointment(clinic_id, first.id).await.unwrap();

        // 取消期间时段被别人订走
        engine
            .book_appointment(new_appointment(clinic_id, 13, "10:00", "Ana Lima"))
            .await
            .unwrap();

        let result = engine
            .change_status(clinic_id, first.id, StatusEvent::Reopen)
            .await;
        assert!(matches!(result, Err(ClinicError::SlotConflict { .. })));
    }

    #[tokio::test]
    async fn test_reschedule_unknown_appointment_is_not_found() {
        let (engine, _) = engine();
        let patch = AppointmentPatch {
            time_minutes: Some(600),
            ..Default::default()
        };

        assert!(matches!(
            engine
                .request_reschedule(Uuid::new_v4(), Uuid::new_v4(), patch)
                .await,
            Err(ClinicError::NotFound(_))
        ));
    }
}
