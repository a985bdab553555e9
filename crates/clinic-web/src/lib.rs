//! # 诊所 Web 模块
//!
//! 对外的 HTTP API：日程视图查询、预约创建/改期/取消。
//! 时段冲突以 409 返回，携带占用者信息。

pub mod handlers;
pub mod server;

pub use handlers::AppState;
pub use server::WebServer;
