//! 日历范围构建
//!
//! 把参考日期和视图模式翻译成具体的可见日期闭区间。

use chrono::{Datelike, Duration, NaiveDate};
use clinic_core::{ClinicError, Result};
use serde::{Deserialize, Serialize};

/// 日历视图模式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,  // 单日视图
    Week, // 整周视图
}

impl TryFrom<&str> for ViewMode {
    type Error = ClinicError;

    /// 不认识的视图模式立即报错，不做静默兜底
    fn try_from(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            _ => Err(ClinicError::InvalidRange(format!(
                "unsupported view mode: {}",
                value
            ))),
        }
    }
}

/// 日历可见日期范围（两端含）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgendaRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AgendaRange {
    /// 日期是否落在范围内（按挂钟日期比较，不经过时间戳）
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 范围覆盖的天数
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// 由参考日期和视图模式计算可见范围
///
/// - 单日视图：起止都是参考日期本身。
/// - 整周视图：ISO-8601 周，周一为起点、周日为终点；
///   参考日期落在周一或周日时同样包含在内。
///
/// 纯函数，重复调用结果恒定。非法的日期字符串和视图模式
/// 在解析边界（`parse_wall_date` / `ViewMode::try_from`）就已报错。
pub fn build_calendar_range(reference: NaiveDate, mode: ViewMode) -> AgendaRange {
    match mode {
        ViewMode::Day => AgendaRange {
            start: reference,
            end: reference,
        },
        ViewMode::Week => {
            let offset = reference.weekday().num_days_from_monday() as i64;
            let start = reference - Duration::days(offset);
            AgendaRange {
                start,
                end: start + Duration::days(6),
            }
        }
    }
}
