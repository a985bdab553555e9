//! 挂钟日期时间工具
//!
//! 预约的日期和时间都是免时区的挂钟值。日期只能从显式的
//! (年, 月, 日) 整数构造，绝不经过会隐含 UTC 午夜的通用解析器，
//! 否则在负 UTC 偏移的机器上日期会整体偏移一天。

use crate::error::{ClinicError, Result};
use chrono::NaiveDate;

/// 时段粒度（分钟）
pub const SLOT_MINUTES: u16 = 30;

/// 从 (年, 月, 日) 整数构造挂钟日期
pub fn wall_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ClinicError::InvalidRange(format!("invalid calendar date: {}-{}-{}", year, month, day))
    })
}

/// 解析 "YYYY-MM-DD" 形式的日期字符串
///
/// 允许携带 "T10:00:00Z" 之类的时间后缀，后缀被整体丢弃：
/// 只拆出年月日三个整数再构造，不做任何时区换算。
pub fn parse_wall_date(input: &str) -> Result<NaiveDate> {
    let date_part = input.split(['T', ' ']).next().unwrap_or(input);

    let mut parts = date_part.splitn(3, '-');
    let (year, month, day) = match (parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), Some(d)) => (
            y.parse::<i32>(),
            m.parse::<u32>(),
            d.parse::<u32>(),
        ),
        _ => {
            return Err(ClinicError::InvalidRange(format!(
                "malformed date string: {}",
                input
            )))
        }
    };

    match (year, month, day) {
        (Ok(y), Ok(m), Ok(d)) => wall_date(y, m, d),
        _ => Err(ClinicError::InvalidRange(format!(
            "malformed date string: {}",
            input
        ))),
    }
}

/// 解析 "HH:MM" 形式的时间为从零点起的分钟数
///
/// 允许 "HH:MM:SS"，秒被忽略。
pub fn parse_wall_time(input: &str) -> Result<u16> {
    let mut parts = input.splitn(3, ':');
    let (hour, minute) = match (parts.next(), parts.next()) {
        (Some(h), Some(m)) => (h.parse::<u16>(), m.parse::<u16>()),
        _ => {
            return Err(ClinicError::InvalidRange(format!(
                "malformed time string: {}",
                input
            )))
        }
    };

    match (hour, minute) {
        (Ok(h), Ok(m)) if h < 24 && m < 60 => Ok(h * 60 + m),
        _ => Err(ClinicError::InvalidRange(format!(
            "malformed time string: {}",
            input
        ))),
    }
}

/// 分钟数格式化为 "HH:MM"
pub fn format_wall_time(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
