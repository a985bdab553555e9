//! 数据库查询操作

use crate::connection::DatabasePool;
use crate::models::DbAppointment;
use async_trait::async_trait;
use chrono::Utc;
use clinic_core::{
    Appointment, AppointmentPatch, AppointmentStore, ClinicError, NewAppointment, Result,
};
use uuid::Uuid;

/// PostgreSQL 预约存储
///
/// 所有查询都带 `clinic_id` 租户条件和 `deleted_at IS NULL`
/// 软删除条件。活跃时段上的部分唯一索引是并发写入的最终防线：
/// 引擎的冲突检查只针对内存快照，检查和提交之间的竞态由它兜底。
pub struct PgAppointmentStore {
    pool: DatabasePool,
}

impl PgAppointmentStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        // 创建预约表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id UUID PRIMARY KEY,
                clinic_id UUID NOT NULL,
                patient_id UUID NOT NULL,
                professional_id UUID NOT NULL,
                room_id UUID NOT NULL,
                patient_name VARCHAR(255) NOT NULL,
                date DATE NOT NULL,
                time_minutes SMALLINT NOT NULL,
                duration_minutes SMALLINT NOT NULL DEFAULT 30,
                status VARCHAR(20) NOT NULL DEFAULT 'scheduled',
                notes TEXT,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                deleted_at TIMESTAMP WITH TIME ZONE
            )
        "#).execute(pool).await.map_err(|e| ClinicError::Database(e.to_string()))?;

        // 创建索引以优化查询性能
        self.create_indexes().await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    async fn create_indexes(&self) -> Result<()> {
        let pool = self.pool.pool();

        let indexes = vec![
            "CREATE INDEX IF NOT EXISTS idx_appointments_clinic_date ON appointments(clinic_id, date)",
            "CREATE INDEX IF NOT EXISTS idx_appointments_professional_id ON appointments(professional_id)",
            "CREATE INDEX IF NOT EXISTS idx_appointments_room_id ON appointments(room_id)",
            "CREATE INDEX IF NOT EXISTS idx_appointments_patient_id ON appointments(patient_id)",
            // 活跃预约的时段唯一约束：同一诊所同一日期同一时间只允许一条
            // 未删除且未取消的记录
            "CREATE UNIQUE INDEX IF NOT EXISTS uniq_appointments_live_slot \
             ON appointments(clinic_id, date, time_minutes) \
             WHERE deleted_at IS NULL AND status <> 'canceled'",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql)
                .execute(pool)
                .await
                .map_err(|e| ClinicError::Database(e.to_string()))?;
        }

        tracing::info!("Database indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    /// 拉取租户内全部未删除的预约
    async fn fetch_appointments(&self, clinic_id: Uuid) -> Result<Vec<Appointment>> {
        let pool = self.pool.pool();

        let rows = sqlx::query_as::<_, DbAppointment>(
            "SELECT * FROM appointments \
             WHERE clinic_id = $1 AND deleted_at IS NULL \
             ORDER BY date, time_minutes",
        )
        .bind(clinic_id)
        .fetch_all(pool)
        .await
        .map_err(|e| ClinicError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    /// 按 ID 查找单条预约
    async fn fetch_appointment(&self, clinic_id: Uuid, id: Uuid) -> Result<Option<Appointment>> {
        let pool = self.pool.pool();

        let row = sqlx::query_as::<_, DbAppointment>(
            "SELECT * FROM appointments \
             WHERE clinic_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(clinic_id)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| ClinicError::Database(e.to_string()))?;

        Ok(row.map(Appointment::from))
    }

    /// 创建预约
    async fn create_appointment(&self, data: NewAppointment) -> Result<Appointment> {
        let pool = self.pool.pool();
        let appointment = data.into_appointment(Uuid::new_v4(), Utc::now());

        sqlx::query(r#"
            INSERT INTO appointments
                (id, clinic_id, patient_id, professional_id, room_id, patient_name,
                 date, time_minutes, duration_minutes, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#)
        .bind(appointment.id)
        .bind(appointment.clinic_id)
        .bind(appointment.patient_id)
        .bind(appointment.professional_id)
        .bind(appointment.room_id)
        .bind(&appointment.patient_name)
        .bind(appointment.date)
        .bind(appointment.time_minutes as i16)
        .bind(appointment.duration_minutes as i16)
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .execute(pool)
        .await
        .map_err(|e| ClinicError::Database(e.to_string()))?;

        tracing::info!("Created appointment {}", appointment.id);
        Ok(appointment)
    }

    /// 部分更新预约
    async fn update_appointment(
        &self,
        clinic_id: Uuid,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment> {
        let pool = self.pool.pool();

        // 先取当前行，套用补丁后整行写回
        let mut appointment = self
            .fetch_appointment(clinic_id, id)
            .await?
            .ok_or_else(|| ClinicError::NotFound(format!("appointment {} not found", id)))?;
        appointment.apply_patch(&patch, Utc::now());

        sqlx::query(r#"
            UPDATE appointments
            SET patient_name = $1, date = $2, time_minutes = $3, status = $4,
                professional_id = $5, room_id = $6, notes = $7, updated_at = $8
            WHERE clinic_id = $9 AND id = $10 AND deleted_at IS NULL
        "#)
        .bind(&appointment.patient_name)
        .bind(appointment.date)
        .bind(appointment.time_minutes as i16)
        .bind(appointment.status.as_str())
        .bind(appointment.professional_id)
        .bind(appointment.room_id)
        .bind(&appointment.notes)
        .bind(appointment.updated_at)
        .bind(clinic_id)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ClinicError::Database(e.to_string()))?;

        tracing::info!("Updated appointment {}", id);
        Ok(appointment)
    }

    /// 软删除预约
    async fn soft_delete_appointment(&self, clinic_id: Uuid, id: Uuid) -> Result<()> {
        let pool = self.pool.pool();

        let result = sqlx::query(
            "UPDATE appointments SET deleted_at = NOW() \
             WHERE clinic_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(clinic_id)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ClinicError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ClinicError::NotFound(format!(
                "appointment {} not found",
                id
            )));
        }

        tracing::info!("Soft-deleted appointment {}", id);
        Ok(())
    }
}
