//! # Clinic Core
//!
//! 诊所系统的核心模块，提供基础数据结构、错误定义、
//! 挂钟日期时间工具和外部协作方契约。

pub mod contracts;
pub mod error;
pub mod models;
pub mod wallclock;

pub use contracts::{AppointmentNotifier, AppointmentStore, MessageKind};
pub use error::{ClinicError, Result};
pub use models::*;
pub use wallclock::{format_wall_time, parse_wall_date, parse_wall_time, wall_date, SLOT_MINUTES};
