//! 诊所服务器主程序

mod config;

use clap::Parser;
use clinic_core::{AppointmentNotifier, AppointmentStore, Result};
use clinic_database::{DatabasePool, PgAppointmentStore};
use clinic_integration::{ChangeFeed, NullNotifier, WhatsAppGateway};
use clinic_scheduling::SchedulingEngine;
use clinic_web::{AppState, WebServer};
use crate::config::ClinicConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber;

/// 诊所服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "clinic-server")]
#[command(about = "多租户诊所管理后端（日程、预约排班与消息通知）")]
struct Args {
    /// 监听端口（覆盖配置文件）
    #[arg(short, long)]
    port: Option<u16>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(&args.log_level)
        .init();

    info!("启动诊所服务器...");

    // 加载配置
    let mut config = ClinicConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!("诊所服务器配置:");
    info!("  监听地址: {}:{}", config.server.host, config.server.port);
    info!("  数据库最大连接数: {}", config.database.max_connections);
    info!(
        "  消息网关: {}",
        config.messaging.gateway_url.as_deref().unwrap_or("（未配置，通知将被丢弃）")
    );

    // 建立数据库连接
    let pool = DatabasePool::connect(&config.database.url, config.database.max_connections).await?;
    let pg_store = Arc::new(PgAppointmentStore::new(pool));
    if config.database.run_migrations {
        pg_store.create_tables().await?;
    }
    let store: Arc<dyn AppointmentStore> = pg_store;

    // 消息协作方
    let notifier: Arc<dyn AppointmentNotifier> = match &config.messaging.gateway_url {
        Some(url) => Arc::new(WhatsAppGateway::new(
            url.clone(),
            config.messaging.signing_secret.clone(),
        )),
        None => Arc::new(NullNotifier),
    };

    // 组装排班引擎与共享状态
    let engine = Arc::new(SchedulingEngine::new(store.clone(), notifier));
    let change_feed = Arc::new(ChangeFeed::default());
    let state = AppState {
        store,
        engine,
        change_feed,
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| clinic_core::ClinicError::Config(format!("invalid listen address: {}", e)))?;

    // 启动Web服务器
    if let Err(e) = WebServer::new(addr, state).run().await {
        error!("服务器启动失败: {}", e);
        return Err(e);
    }

    Ok(())
}
