//! 预约状态机
//!
//! 管理预约的完整生命周期状态转换

use clinic_core::{AppointmentStatus, ClinicError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 预约状态转换事件
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusEvent {
    Confirm,    // 患者确认到诊
    Complete,   // 就诊完成
    MarkNoShow, // 标记爽约
    Cancel,     // 取消预约
    Reopen,     // 取消后重新排回
}

/// 预约状态机
#[derive(Debug)]
pub struct StatusStateMachine {
    transitions: HashMap<(AppointmentStatus, StatusEvent), AppointmentStatus>,
}

impl StatusStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        let mut transitions = HashMap::new();

        // 定义状态转换规则
        transitions.insert(
            (AppointmentStatus::Scheduled, StatusEvent::Confirm),
            AppointmentStatus::Confirmed,
        );
        transitions.insert(
            (AppointmentStatus::Scheduled, StatusEvent::Cancel),
            AppointmentStatus::Canceled,
        );
        transitions.insert(
            (AppointmentStatus::Confirmed, StatusEvent::Complete),
            AppointmentStatus::Completed,
        );
        transitions.insert(
            (AppointmentStatus::Confirmed, StatusEvent::MarkNoShow),
            AppointmentStatus::NoShow,
        );
        transitions.insert(
            (AppointmentStatus::Confirmed, StatusEvent::Cancel),
            AppointmentStatus::Canceled,
        );
        transitions.insert(
            (AppointmentStatus::Canceled, StatusEvent::Reopen),
            AppointmentStatus::Scheduled,
        );

        Self { transitions }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, from: AppointmentStatus, event: StatusEvent) -> bool {
        self.transitions.contains_key(&(from, event))
    }

    /// 执行状态转换
    pub fn transition(
        &self,
        from: AppointmentStatus,
        event: StatusEvent,
    ) -> Result<AppointmentStatus> {
        match self.transitions.get(&(from, event)) {
            Some(to) => Ok(*to),
            None => Err(ClinicError::InvalidStatusTransition {
                from: from.as_str().to_string(),
                event: format!("{:?}", event),
            }),
        }
    }

    /// 查找能把 `from` 带到 `to` 的事件
    ///
    /// 对外接口（API 补丁）提交的是目标状态而非事件，用它反查。
    pub fn event_for(
        &self,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Option<StatusEvent> {
        self.transitions
            .iter()
            .find(|((state, _), target)| *state == from && **target == to)
            .map(|((_, event), _)| *event)
    }

    /// 获取某状态下所有可能的事件
    pub fn possible_events(&self, current: AppointmentStatus) -> Vec<StatusEvent> {
        self.transitions
            .keys()
            .filter(|(state, _)| *state == current)
            .map(|(_, event)| *event)
            .collect()
    }
}

impl Default for StatusStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        let sm = StatusStateMachine::new();

        // 测试有效转换
        assert!(sm.can_transition(AppointmentStatus::Scheduled, StatusEvent::Confirm));
        assert!(sm.can_transition(AppointmentStatus::Confirmed, StatusEvent::Complete));
        assert!(sm.can_transition(AppointmentStatus::Confirmed, StatusEvent::MarkNoShow));
        assert!(sm.can_transition(AppointmentStatus::Canceled, StatusEvent::Reopen));
    }

    #[test]
    fn test_invalid_transitions() {
        let sm = StatusStateMachine::new();

        // 测试无效转换
        assert!(!sm.can_transition(AppointmentStatus::Completed, StatusEvent::Cancel));
        assert!(!sm.can_transition(AppointmentStatus::Canceled, StatusEvent::Complete));
        assert!(!sm.can_transition(AppointmentStatus::Scheduled, StatusEvent::Complete));
        assert!(!sm.can_transition(AppointmentStatus::NoShow, StatusEvent::Confirm));
    }

    #[test]
    fn test_transition_execution() {
        let sm = StatusStateMachine::new();

        let result = sm.transition(AppointmentStatus::Scheduled, StatusEvent::Confirm);
        assert_eq!(result.unwrap(), AppointmentStatus::Confirmed);

        let result = sm.transition(AppointmentStatus::Scheduled, StatusEvent::Complete);
        assert!(matches!(
            result,
            Err(ClinicError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_event_for_target_status() {
        let sm = StatusStateMachine::new();

        assert_eq!(
            sm.event_for(AppointmentStatus::Scheduled, AppointmentStatus::Confirmed),
            Some(StatusEvent::Confirm)
        );
        assert_eq!(
            sm.event_for(AppointmentStatus::Canceled, AppointmentStatus::Scheduled),
            Some(StatusEvent::Reopen)
        );
        assert_eq!(
            sm.event_for(AppointmentStatus::Scheduled, AppointmentStatus::Completed),
            None
        );
    }

    #[test]
    fn test_possible_events() {
        let sm = StatusStateMachine::new();

        let mut events = sm.possible_events(AppointmentStatus::Confirmed);
        events.sort_by_key(|e| format!("{:?}", e));
        assert_eq!(
            events,
            vec![StatusEvent::Cancel, StatusEvent::Complete, StatusEvent::MarkNoShow]
        );

        assert!(sm.possible_events(AppointmentStatus::Completed).is_empty());
    }
}
