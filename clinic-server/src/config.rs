//! 配置管理
//!
//! 分层配置：内置默认值 ← TOML 配置文件 ← `CLINIC_` 前缀的
//! 环境变量（`CLINIC_SERVER__PORT=8080` 这种双下划线分节形式）。

use clinic_core::{ClinicError, Result};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 诊所服务完整配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 消息网关配置
    #[serde(default)]
    pub messaging: MessagingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 连接字符串
    pub url: String,
    /// 最大连接数
    pub max_connections: u32,
    /// 启动时建表建索引
    pub run_migrations: bool,
}

/// 消息网关配置
///
/// 不配置网关地址时通知走空实现，消息被丢弃。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagingConfig {
    #[serde(default)]
    pub gateway_url: Option<String>,
    #[serde(default)]
    pub signing_secret: Option<String>,
}

impl ClinicConfig {
    /// 加载配置
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::build(path).map_err(|e| ClinicError::Config(e.to_string()))
    }

    fn build(path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "postgres://localhost/clinic")?
            .set_default("database.max_connections", 10)?
            .set_default("database.run_migrations", true)?;

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        builder = builder.add_source(Environment::with_prefix("CLINIC").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = ClinicConfig::load(None).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.database.run_migrations);
        assert!(config.messaging.gateway_url.is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(ClinicConfig::load(Some("/nonexistent/clinic.toml")).is_err());
    }
}
