//! 日程失效信号
//!
//! 写路径提交成功后广播 "该诊所的日程已失效"；订阅方（长连接
//! 推送、缓存层）收到后自行重取快照。信号只携带租户和触发
//! 事件类型，不携带数据本身，避免订阅方依赖陈旧载荷。

use crate::events::ScheduleEventKind;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// 日程失效通知
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaInvalidated {
    pub clinic_id: Uuid,
    pub triggered_by: ScheduleEventKind,
}

/// 失效信号广播器
pub struct ChangeFeed {
    sender: broadcast::Sender<AgendaInvalidated>,
}

impl ChangeFeed {
    /// 创建新的广播器
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 订阅失效信号
    pub fn subscribe(&self) -> broadcast::Receiver<AgendaInvalidated> {
        self.sender.subscribe()
    }

    /// 广播一次失效
    ///
    /// 没有订阅方时发送失败是正常情况，直接忽略。
    pub fn emit_invalidate(&self, clinic_id: Uuid, triggered_by: ScheduleEventKind) {
        let notice = AgendaInvalidated {
            clinic_id,
            triggered_by,
        };
        match self.sender.send(notice) {
            Ok(receivers) => debug!(
                "Agenda invalidated for clinic {} ({} subscribers)",
                clinic_id, receivers
            ),
            Err(_) => debug!("Agenda invalidated for clinic {} (no subscribers)", clinic_id),
        }
    }

    /// 当前订阅方数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}
