//! # 示例应用程序
//!
//! 演示服务容器的引导、依赖解析、服务组与解析回调

use anyhow::Context;
use clap::Parser;
use di_impl::{
    BootstrapContext, Bootstrapper, ContainerResult, Resolution, ServiceContainer,
    ServiceLocatorExt,
};
use infrastructure_common::{init_logging, ContainerConfig, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "服务容器示例应用")]
struct Args {
    /// 容器配置文件路径（toml/json/yaml）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 输出 JSON 格式日志
    #[arg(long)]
    json_logs: bool,
}

/// 应用配置，作为容器选项注入
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppOptions {
    database_url: String,
    pool_size: u32,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/example".to_string(),
            pool_size: 4,
        }
    }
}

#[derive(Debug)]
struct Database {
    url: String,
    pool_size: u32,
}

#[derive(Debug)]
struct UserRepository {
    database: Arc<Database>,
}

impl UserRepository {
    fn describe(&self) -> String {
        format!(
            "users@{} (pool {})",
            self.database.url, self.database.pool_size
        )
    }
}

#[derive(Debug)]
struct AuditLog {
    database: Arc<Database>,
}

/// 基础设施服务：配置与数据库
struct InfrastructureModule;

impl Bootstrapper for InfrastructureModule {
    fn bootstrap(&self, ctx: &BootstrapContext<'_>) -> ContainerResult<()> {
        ctx.register("options", |locator| async move {
            let options: AppOptions = locator.config().bind()?;
            Ok(Resolution::value(options))
        })?;

        ctx.register_with("database", ["options"], |locator| async move {
            let options = locator.get_as::<AppOptions>("options")?;
            info!("连接数据库: {}", options.database_url);
            Ok(Resolution::value(Database {
                url: options.database_url.clone(),
                pool_size: options.pool_size,
            }))
        })?;

        ctx.resolved("database", |_, resolved| {
            if let Some(database) = resolved.downcast::<Database>() {
                info!("数据库已就绪: {}", database.url);
            }
            Ok(())
        })
    }
}

/// 管理后台服务，收集到 admin 服务组
struct AdminModule;

impl Bootstrapper for AdminModule {
    fn bootstrap(&self, ctx: &BootstrapContext<'_>) -> ContainerResult<()> {
        ctx.register_with("users", ["database"], |locator| async move {
            let database = locator.get_as::<Database>("database")?;
            Ok(Resolution::value(UserRepository { database }))
        })?
        .add_to_group("admin")?;

        ctx.register_with("audit", ["database"], |locator| async move {
            let database = locator.get_as::<Database>("database")?;
            Ok(Resolution::module(AuditLog { database }))
        })?
        .add_to_group("admin")?;

        ctx.resolved("admin", |_, resolved| {
            info!("admin 服务组已就绪: {:?}", resolved.member_names());
            Ok(())
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = LoggingConfig {
        json_format: args.json_logs,
        ..LoggingConfig::default()
    }
    .with_level(LoggingConfig::parse_level(&args.log_level));
    init_logging(&logging)?;

    info!("启动服务容器示例应用");

    let config = ContainerConfig::load(args.config.as_deref()).context("加载容器配置失败")?;
    let container = build_container(config)?;

    if let Err(e) = container.validate() {
        warn!("依赖关系检查未通过: {}", e);
    }

    demonstrate_resolution(&container).await?;
    demonstrate_group(&container).await?;

    let stats = container.stats();
    info!(
        "容器统计: {} 个服务, {} 个服务组, {} 个已解析, {} 个回调",
        stats.registered_services, stats.registered_groups, stats.resolved_services, stats.callbacks
    );

    info!("应用已退出");
    Ok(())
}

/// 构建容器并执行引导
fn build_container(config: ContainerConfig) -> anyhow::Result<ServiceContainer> {
    info!("构建服务容器");

    let options = serde_json::to_value(AppOptions::default())?;
    let container = ServiceContainer::builder()
        .config(config)
        .options(infrastructure_common::ConfigSection::from_value(options)?)
        .build();

    container.bootstrap_all([
        Box::new(InfrastructureModule) as Box<dyn Bootstrapper>,
        Box::new(AdminModule),
    ])?;

    info!("已注册: {:?}", container.registered_names());
    Ok(container)
}

/// 演示依赖解析与缓存
async fn demonstrate_resolution(container: &ServiceContainer) -> anyhow::Result<()> {
    info!("演示依赖解析");

    let users = container.resolve_as::<UserRepository>("users").await?;
    info!("解析 users 成功: {}", users.describe());

    // 第二次解析命中缓存
    let again = container.resolve_as::<UserRepository>("users").await?;
    info!("再次解析返回同一实例: {}", Arc::ptr_eq(&users, &again));

    let database = container.get_as::<Database>("database")?;
    info!("同步读取 database: {}", database.url);
    Ok(())
}

/// 演示服务组解析
async fn demonstrate_group(container: &ServiceContainer) -> anyhow::Result<()> {
    info!("演示服务组解析");

    let admin = container.resolve("admin").await?;
    for name in admin.member_names() {
        info!("admin 成员: {}", name);
    }

    if let Some(audit) = admin.member("audit").and_then(|m| m.downcast::<AuditLog>()) {
        info!("审计日志写入 {}", audit.database.url);
    }
    Ok(())
}
