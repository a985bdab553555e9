//! 患者消息网关
//!
//! 把预约通知投递到外部 WhatsApp 风格的消息网关。投递结果
//! 对排班流程不可见：调用方 spawn 后即忘，失败只记日志。

use async_trait::async_trait;
use clinic_core::{Appointment, AppointmentNotifier, ClinicError, MessageKind, Result};
use serde::Serialize;
use tracing::{debug, info};

/// 发给网关的消息载荷
#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    appointment_id: String,
    message_type: &'static str,
    patient: &'a str,
    date: String,
    time: String,
}

impl<'a> MessagePayload<'a> {
    fn new(appointment: &'a Appointment, kind: MessageKind) -> Self {
        Self {
            appointment_id: appointment.id.to_string(),
            message_type: kind.as_str(),
            patient: appointment.patient_name.as_str(),
            date: appointment.date.to_string(),
            time: appointment.time_label(),
        }
    }
}

/// WhatsApp 消息网关客户端
pub struct WhatsAppGateway {
    client: reqwest::Client,
    base_url: String,
    secret: Option<String>,
}

impl WhatsAppGateway {
    /// 创建新的网关客户端
    pub fn new(base_url: String, secret: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            secret,
        }
    }

    /// 生成载荷签名
    fn generate_signature(&self, payload: &str) -> Option<String> {
        use sha2::{Digest, Sha256};

        self.secret.as_ref().map(|secret| {
            let mut hasher = Sha256::new();
            hasher.update(payload);
            hasher.update(secret);
            format!("sha256={:x}", hasher.finalize())
        })
    }
}

#[async_trait]
impl AppointmentNotifier for WhatsAppGateway {
    async fn notify(&self, appointment: &Appointment, kind: MessageKind) -> Result<()> {
        let payload = serde_json::to_string(&MessagePayload::new(appointment, kind))?;

        let mut request = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("Content-Type", "application/json")
            .header("User-Agent", "Clinic-Messaging/1.0");

        // 添加签名头
        if let Some(signature) = self.generate_signature(&payload) {
            request = request.header("X-Clinic-Signature", signature);
        }

        match request.body(payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!(
                    "Delivered {} message for appointment {}",
                    kind.as_str(),
                    appointment.id
                );
                Ok(())
            }
            Ok(response) => Err(ClinicError::Messaging(format!(
                "gateway returned status {}",
                response.status()
            ))),
            Err(e) => Err(ClinicError::Messaging(e.to_string())),
        }
    }
}

/// 丢弃所有消息的空实现（测试和演示场景）
pub struct NullNotifier;

#[async_trait]
impl AppointmentNotifier for NullNotifier {
    async fn notify(&self, appointment: &Appointment, kind: MessageKind) -> Result<()> {
        debug!(
            "Dropping {} message for appointment {}",
            kind.as_str(),
            appointment.id
        );
        Ok(())
    }
}
