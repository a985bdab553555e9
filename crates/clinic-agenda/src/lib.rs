//! # 日程引擎模块
//!
//! 日历视图物化与时段冲突检测的纯计算核心，包括：
//! - 日历范围构建：参考日期 + 视图模式 → 可见日期闭区间
//! - 预约过滤：按日期范围、医生、诊室筛选可见预约
//! - 时段冲突检测：候选 (日期, 时间) 与现有预约的碰撞判定
//!
//! 引擎不持有任何状态：预约快照由调用方注入，所有函数都是
//! 纯函数，对同一输入幂等。

pub mod conflict;
pub mod filter;
pub mod range;

// 重新导出主要类型
pub use conflict::find_conflict;
pub use filter::{filter_appointments, ScopeFilter};
pub use range::{build_calendar_range, AgendaRange, ViewMode};
