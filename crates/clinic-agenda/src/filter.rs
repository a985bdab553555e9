//! 预约过滤
//!
//! 从完整的预约快照里筛出当前视图关心的子集。

use crate::range::AgendaRange;
use clinic_core::{Appointment, ClinicError, Result};
use uuid::Uuid;

/// 过滤维度：全部，或限定到单个 ID
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeFilter {
    #[default]
    All,
    Only(Uuid),
}

impl ScopeFilter {
    pub fn matches(&self, id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == id,
        }
    }
}

impl TryFrom<&str> for ScopeFilter {
    type Error = ClinicError;

    /// 查询参数 "all"（或空串）表示不过滤，其余必须是合法 UUID
    fn try_from(value: &str) -> Result<Self> {
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Uuid::parse_str(value)
            .map(Self::Only)
            .map_err(|_| ClinicError::Validation(format!("invalid filter id: {}", value)))
    }
}

/// 筛选落在范围内且命中医生/诊室过滤器的预约
///
/// 日期按挂钟日期比较。输出保持输入顺序，除持久层返回的顺序外
/// 不提供任何排序保证。纯函数，对已过滤的列表再过滤结果不变。
pub fn filter_appointments(
    appointments: &[Appointment],
    range: AgendaRange,
    professional: ScopeFilter,
    room: ScopeFilter,
) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|appointment| {
            range.contains(appointment.date)
                && professional.matches(appointment.professional_id)
                && room.matches(appointment.room_id)
        })
        .cloned()
        .collect()
}
