//! # 排班模块
//!
//! 提供预约排班的编排功能，包括：
//! - 预约状态机：管理预约的完整生命周期状态转换
//! - 排班引擎：新建与改期前的冲突检查编排（检查通过才落库），
//!   以及提交后的 fire-and-forget 患者通知

pub mod engine;
pub mod lifecycle;

// 重新导出主要类型
pub use engine::{ScheduleDecision, SchedulingEngine};
pub use lifecycle::{StatusEvent, StatusStateMachine};
