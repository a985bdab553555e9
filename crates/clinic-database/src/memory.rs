//! 内存预约存储
//!
//! 测试和演示场景用的 `AppointmentStore` 实现。行为与
//! PostgreSQL 实现对齐（租户隔离、软删除后不可见、按日期
//! 时间排序），但有意不带时段唯一约束——纯引擎的冲突检查
//! 本来就是咨询性质的。

use async_trait::async_trait;
use chrono::Utc;
use clinic_core::{
    Appointment, AppointmentPatch, AppointmentStore, ClinicError, NewAppointment, Result,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// 内存预约存储
pub struct MemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl MemoryAppointmentStore {
    /// 创建空的内存存储
    pub fn new() -> Self {
        Self {
            appointments: RwLock::new(HashMap::new()),
        }
    }

    /// 当前存量（含全部租户）
    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.appointments.read().await.is_empty()
    }
}

impl Default for MemoryAppointmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn fetch_appointments(&self, clinic_id: Uuid) -> Result<Vec<Appointment>> {
        let appointments = self.appointments.read().await;
        let mut result: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.clinic_id == clinic_id)
            .cloned()
            .collect();
        // 与 PostgreSQL 实现的 ORDER BY 对齐
        result.sort_by_key(|a| (a.date, a.time_minutes));
        Ok(result)
    }

    async fn fetch_appointment(&self, clinic_id: Uuid, id: Uuid) -> Result<Option<Appointment>> {
        let appointments = self.appointments.read().await;
        Ok(appointments
            .get(&id)
            .filter(|a| a.clinic_id == clinic_id)
            .cloned())
    }

    async fn create_appointment(&self, data: NewAppointment) -> Result<Appointment> {
        let appointment = data.into_appointment(Uuid::new_v4(), Utc::now());
        let mut appointments = self.appointments.write().await;
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        clinic_id: Uuid,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment> {
        let mut appointments = self.appointments.write().await;
        match appointments.get_mut(&id).filter(|a| a.clinic_id == clinic_id) {
            Some(appointment) => {
                appointment.apply_patch(&patch, Utc::now());
                Ok(appointment.clone())
            }
            None => Err(ClinicError::NotFound(format!(
                "appointment {} not found",
                id
            ))),
        }
    }

    async fn soft_delete_appointment(&self, clinic_id: Uuid, id: Uuid) -> Result<()> {
        let mut appointments = self.appointments.write().await;
        match appointments.get(&id) {
            Some(appointment) if appointment.clinic_id == clinic_id => {
                // 软删除后记录对所有查询不可见，内存实现直接移除
                appointments.remove(&id);
                Ok(())
            }
            _ => Err(ClinicError::NotFound(format!(
                "appointment {} not found",
                id
            ))),
        }
    }
}
