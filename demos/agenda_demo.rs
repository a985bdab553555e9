//! 日程引擎演示程序
//!
//! 展示日历范围构建、预约过滤和时段冲突检测的纯计算核心

use chrono::Utc;
use clinic_agenda::{build_calendar_range, filter_appointments, find_conflict, ScopeFilter, ViewMode};
use clinic_core::{
    parse_wall_time, wall_date, Appointment, AppointmentStatus, SLOT_MINUTES,
};
use uuid::Uuid;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    println!("📅 诊所日程引擎演示\n");

    let clinic_id = Uuid::new_v4();
    let dr_silva = Uuid::new_v4();
    let dr_costa = Uuid::new_v4();
    let room_1 = Uuid::new_v4();

    // 1. 构造一周的预约快照
    let appointments = vec![
        appointment(clinic_id, dr_silva, room_1, 10, "09:00", "Maria Souza"),
        appointment(clinic_id, dr_silva, room_1, 10, "10:00", "Ana Lima"),
        appointment(clinic_id, dr_costa, room_1, 12, "14:30", "Carlos Pereira"),
        appointment(clinic_id, dr_silva, room_1, 14, "11:00", "João Alves"),
        appointment(clinic_id, dr_costa, room_1, 21, "09:00", "Paula Reis"), // 下一周
    ];
    println!("✅ 构造了 {} 条预约", appointments.len());

    // 2. 周视图范围
    let reference = wall_date(2024, 6, 13)?;
    let week = build_calendar_range(reference, ViewMode::Week);
    println!("\n📊 参考日期 {} 的周视图范围: {} ~ {}", reference, week.start, week.end);

    let visible = filter_appointments(&appointments, week, ScopeFilter::All, ScopeFilter::All);
    println!("   本周可见预约: {} 条", visible.len());
    for a in &visible {
        println!("   - {} {} {}", a.date, a.time_label(), a.patient_name);
    }

    // 3. 按医生过滤
    let silva_only = filter_appointments(
        &appointments,
        week,
        ScopeFilter::Only(dr_silva),
        ScopeFilter::All,
    );
    println!("\n👨‍⚕️ 只看 Silva 医生: {} 条", silva_only.len());

    // 4. 冲突检测
    let date = wall_date(2024, 6, 10)?;
    let taken = parse_wall_time("10:00")?;
    match find_conflict(date, taken, None, &visible) {
        Some(conflict) => println!(
            "\n⚠️  {} {} 已被 {} 占用",
            date,
            conflict.time_label(),
            conflict.patient_name
        ),
        None => println!("\n✅ {} 10:00 空闲", date),
    }

    let free = parse_wall_time("10:30")?;
    match find_conflict(date, free, None, &visible) {
        Some(_) => println!("⚠️  {} 10:30 被占用", date),
        None => println!("✅ {} 10:30 空闲（相邻时段互不冲突）", date),
    }

    println!("\n🎉 演示结束");
    Ok(())
}

fn appointment(
    clinic_id: Uuid,
    professional_id: Uuid,
    room_id: Uuid,
    day: u32,
    time: &str,
    patient: &str,
) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        clinic_id,
        patient_id: Uuid::new_v4(),
        professional_id,
        room_id,
        patient_name: patient.to_string(),
        date: wall_date(2024, 6, day).unwrap(),
        time_minutes: parse_wall_time(time).unwrap(),
        duration_minutes: SLOT_MINUTES,
        status: AppointmentStatus::Scheduled,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}
