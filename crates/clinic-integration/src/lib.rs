//! # 诊所集成模块
//!
//! 提供与外部系统的集成功能，包括：
//! - 排班事件：预约创建/改期/取消等事件的统一封装
//! - 患者消息网关：WhatsApp 风格的 HTTP 投递客户端，
//!   对排班流程是 fire-and-forget
//! - 日程失效信号：显式的 "失效并重取" 广播，订阅方收到后
//!   自行重新拉取快照，不与任何具体的发布订阅传输耦合

pub mod change_feed;
pub mod events;
pub mod messaging;

pub use change_feed::{AgendaInvalidated, ChangeFeed};
pub use events::{ScheduleEvent, ScheduleEventKind};
pub use messaging::{NullNotifier, WhatsAppGateway};
