//! # Clinic
//!
//! 多租户诊所管理后端的门面 crate，按子系统重导出各成员：
//! 纯计算的日程引擎、排班编排、持久化与集成协作方。
//! 示例程序见 `demos/` 目录。

pub use clinic_agenda as agenda;
pub use clinic_core as core;
pub use clinic_database as database;
pub use clinic_integration as integration;
pub use clinic_scheduling as scheduling;
