//! 排班引擎演示程序
//!
//! 展示新建预约、冲突拒绝、改期和取消后重开的完整编排流程

use clinic_core::{parse_wall_time, wall_date, AppointmentPatch, NewAppointment};
use clinic_database::MemoryAppointmentStore;
use clinic_integration::NullNotifier;
use clinic_scheduling::{ScheduleDecision, SchedulingEngine, StatusEvent};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    println!("🗓️  诊所排班引擎演示\n");

    let store = Arc::new(MemoryAppointmentStore::new());
    let engine = SchedulingEngine::new(store.clone(), Arc::new(NullNotifier));
    let clinic_id = Uuid::new_v4();

    // 1. 新建预约
    let maria = engine
        .book_appointment(booking(clinic_id, "10:00", "Maria Souza"))
        .await?
        .into_result()?;
    println!("✅ Maria Souza 预约成功: {} {}", maria.date, maria.time_label());

    // 2. 同一时段再订，被拒绝
    match engine
        .book_appointment(booking(clinic_id, "10:00", "Ana Lima"))
        .await?
    {
        ScheduleDecision::Rejected { conflict } => {
            println!("⚠️  Ana Lima 订 10:00 被拒: 已被 {} 占用", conflict.patient_name)
        }
        ScheduleDecision::Accepted(_) => unreachable!("expected rejection"),
    }

    // 3. 相邻时段不冲突
    let ana = engine
        .book_appointment(booking(clinic_id, "10:30", "Ana Lima"))
        .await?
        .into_result()?;
    println!("✅ Ana Lima 改订相邻时段成功: {}", ana.time_label());

    // 4. 改期
    let patch = AppointmentPatch {
        time_minutes: Some(parse_wall_time("15:00")?),
        ..Default::default()
    };
    let moved = engine
        .request_reschedule(clinic_id, maria.id, patch)
        .await?
        .into_result()?;
    println!("✅ Maria Souza 改期到 {}", moved.time_label());

    // 5. 取消后时段立即可用
    engine.cancel_appointment(clinic_id, ana.id).await?;
    println!("✅ Ana Lima 的预约已取消");

    let carlos = engine
        .book_appointment(booking(clinic_id, "10:30", "Carlos Pereira"))
        .await?
        .into_result()?;
    println!("✅ Carlos Pereira 订到了刚释放的 {}", carlos.time_label());

    // 6. 取消后重开：时段已被占，重开失败
    match engine.change_status(clinic_id, ana.id, StatusEvent::Reopen).await {
        Err(e) => println!("⚠️  Ana Lima 重开失败: {}", e),
        Ok(_) => unreachable!("slot is taken"),
    }

    println!("\n📊 当前存量预约: {} 条", store.len().await);
    println!("🎉 演示结束");
    Ok(())
}

fn booking(clinic_id: Uuid, time: &str, patient: &str) -> NewAppointment {
    NewAppointment {
        clinic_id,
        patient_id: Uuid::new_v4(),
        professional_id: Uuid::new_v4(),
        room_id: Uuid::new_v4(),
        patient_name: patient.to_string(),
        date: wall_date(2024, 6, 13).unwrap(),
        time_minutes: parse_wall_time(time).unwrap(),
        notes: None,
    }
}
