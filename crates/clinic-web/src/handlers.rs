//! HTTP处理器

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use clinic_agenda::{build_calendar_range, filter_appointments, ScopeFilter, ViewMode};
use clinic_core::{
    parse_wall_date, parse_wall_time, AppointmentPatch, AppointmentStatus, AppointmentStore,
    ClinicError, NewAppointment,
};
use clinic_integration::{ChangeFeed, ScheduleEvent, ScheduleEventKind};
use clinic_scheduling::SchedulingEngine;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 共享应用状态
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AppointmentStore>,
    pub engine: Arc<SchedulingEngine>,
    pub change_feed: Arc<ChangeFeed>,
}

/// 对外错误封装：核心错误到 HTTP 状态码的映射
pub struct ApiError(ClinicError);

impl From<ClinicError> for ApiError {
    fn from(err: ClinicError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self.0 {
            // 用户可见的冲突提示
            ClinicError::SlotConflict { patient, .. } => (
                StatusCode::CONFLICT,
                format!("this time slot is already taken by {}", patient),
            ),
            ClinicError::InvalidStatusTransition { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string())
            }
            ClinicError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            ClinicError::Validation(_) | ClinicError::InvalidRange(_) => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "Clinic Web API",
        "version": "0.1.0",
        "status": "running",
        "endpoints": {
            "health": "/health",
            "agenda": "/api/v1/agenda",
            "appointments": "/api/v1/appointments"
        }
    }))
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": "0.1.0"
    }))
}

/// 日程视图查询参数
#[derive(Debug, Deserialize)]
pub struct AgendaQueryParams {
    pub clinic_id: Uuid,
    /// 参考日期 "YYYY-MM-DD"
    pub date: String,
    /// 视图模式 "day" | "week"，缺省为单日视图
    pub view: Option<String>,
    /// 医生过滤："all" 或 UUID
    pub professional: Option<String>,
    /// 诊室过滤："all" 或 UUID
    pub room: Option<String>,
}

/// 日程视图查询处理器
pub async fn get_agenda(
    State(state): State<AppState>,
    Query(params): Query<AgendaQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Getting agenda with query: {:?}", params);

    let reference = parse_wall_date(&params.date)?;
    let mode = match params.view.as_deref() {
        Some(view) => ViewMode::try_from(view)?,
        None => ViewMode::Day,
    };
    let professional = ScopeFilter::try_from(params.professional.as_deref().unwrap_or("all"))?;
    let room = ScopeFilter::try_from(params.room.as_deref().unwrap_or("all"))?;

    let range = build_calendar_range(reference, mode);
    let snapshot = state.store.fetch_appointments(params.clinic_id).await?;
    let appointments = filter_appointments(&snapshot, range, professional, room);
    let total = appointments.len();

    Ok(Json(json!({
        "range": { "start": range.start, "end": range.end },
        "view": mode,
        "appointments": appointments,
        "total": total
    })))
}

/// 创建预约请求体
#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub room_id: Uuid,
    pub patient_name: String,
    /// "YYYY-MM-DD"
    pub date: String,
    /// "HH:MM"
    pub time: String,
    pub notes: Option<String>,
}

/// 创建预约处理器
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "Creating appointment for patient {} at {} {}",
        request.patient_id, request.date, request.time
    );

    let data = NewAppointment {
        clinic_id: request.clinic_id,
        patient_id: request.patient_id,
        professional_id: request.professional_id,
        room_id: request.room_id,
        patient_name: request.patient_name,
        date: parse_wall_date(&request.date)?,
        time_minutes: parse_wall_time(&request.time)?,
        notes: request.notes,
    };

    let appointment = state.engine.book_appointment(data).await?.into_result()?;

    emit(&state, ScheduleEventKind::AppointmentCreated, &appointment);
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// 更新预约请求体（改期和/或状态变更）
#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub clinic_id: Uuid,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub professional_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    /// 请求体转成核心补丁，日期时间在这里解析
    fn into_patch(self) -> Result<AppointmentPatch, ClinicError> {
        Ok(AppointmentPatch {
            date: self.date.as_deref().map(parse_wall_date).transpose()?,
            time_minutes: self.time.as_deref().map(parse_wall_time).transpose()?,
            status: self.status,
            professional_id: self.professional_id,
            room_id: self.room_id,
            notes: self.notes,
        })
    }
}

/// 更新预约处理器
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Updating appointment {}", id);

    let clinic_id = request.clinic_id;
    let patch = request.into_patch()?;
    let rescheduled = patch.touches_schedule();
    let canceled = patch.status == Some(AppointmentStatus::Canceled);

    let appointment = state
        .engine
        .request_reschedule(clinic_id, id, patch)
        .await?
        .into_result()?;

    let kind = if rescheduled {
        ScheduleEventKind::AppointmentRescheduled
    } else if canceled {
        ScheduleEventKind::AppointmentCanceled
    } else {
        ScheduleEventKind::AppointmentStatusChanged
    };
    emit(&state, kind, &appointment);
    Ok(Json(appointment))
}

/// 删除预约查询参数
#[derive(Debug, Deserialize)]
pub struct ClinicScopeParams {
    pub clinic_id: Uuid,
}

/// 删除预约处理器（软删除）
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ClinicScopeParams>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Deleting appointment {}", id);

    let appointment = state
        .store
        .fetch_appointment(params.clinic_id, id)
        .await?
        .ok_or_else(|| ClinicError::NotFound(format!("appointment {} not found", id)))?;
    state
        .store
        .soft_delete_appointment(params.clinic_id, id)
        .await?;

    emit(&state, ScheduleEventKind::AppointmentCanceled, &appointment);
    Ok(StatusCode::NO_CONTENT)
}

/// 提交成功后记录排班事件并广播日程失效
fn emit(state: &AppState, kind: ScheduleEventKind, appointment: &clinic_core::Appointment) {
    // 事件以结构化日志落地，作为审计轨迹
    match ScheduleEvent::for_appointment(kind, appointment)
        .and_then(|event| Ok(serde_json::to_string(&event)?))
    {
        Ok(event_json) => info!("schedule event: {}", event_json),
        Err(e) => tracing::warn!("Failed to record schedule event: {}", e),
    }
    state.change_feed.emit_invalidate(appointment.clinic_id, kind);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_into_patch() {
        let request = UpdateAppointmentRequest {
            clinic_id: Uuid::new_v4(),
            date: Some("2024-06-14".to_string()),
            time: Some("10:30".to_string()),
            status: None,
            professional_id: None,
            room_id: None,
            notes: None,
        };

        let patch = request.into_patch().unwrap();
        assert!(patch.touches_schedule());
        assert_eq!(patch.time_minutes, Some(630));
    }

    #[test]
    fn test_malformed_date_in_patch_fails_fast() {
        let request = UpdateAppointmentRequest {
            clinic_id: Uuid::new_v4(),
            date: Some("14/06/2024".to_string()),
            time: None,
            status: None,
            professional_id: None,
            room_id: None,
            notes: None,
        };

        assert!(matches!(
            request.into_patch(),
            Err(ClinicError::InvalidRange(_))
        ));
    }
}
