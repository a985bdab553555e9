//! # 诊所数据库模块
//!
//! 预约数据的持久化协作方实现：PostgreSQL 连接池、租户隔离的
//! CRUD 操作与软删除，以及测试/演示用的内存实现。

pub mod connection;
pub mod memory;
pub mod models;
pub mod queries;

// 重新导出主要类型
pub use connection::DatabasePool;
pub use memory::MemoryAppointmentStore;
pub use models::DbAppointment;
pub use queries::PgAppointmentStore;
