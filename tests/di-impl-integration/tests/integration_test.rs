//! 服务容器跨 crate 集成测试：引导、自定义工厂与配置
use async_trait::async_trait;
use di_abstractions::{ServiceFactory, ServiceLocatorExt, ServiceLocatorRef};
use di_impl::{
    BootstrapContext, Bootstrapper, ContainerError, ContainerResult, Resolution, ServiceContainer,
};
use infrastructure_common::{BoxError, ConfigSection, ContainerConfig};
use serde::Deserialize;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Database {
    url: String,
}

#[derive(Debug)]
struct UserRepository {
    database: Arc<Database>,
}

/// 依赖 database 的仓储工厂
struct RepositoryFactory {
    created: Arc<AtomicUsize>,
}

#[async_trait]
impl ServiceFactory for RepositoryFactory {
    async fn create(&self, locator: ServiceLocatorRef) -> Result<Resolution, BoxError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let database = locator.get_as::<Database>("database")?;
        Ok(Resolution::value(UserRepository { database }))
    }
}

struct DatabaseModule {
    url: &'static str,
}

impl Bootstrapper for DatabaseModule {
    fn bootstrap(&self, ctx: &BootstrapContext<'_>) -> ContainerResult<()> {
        let url = self.url.to_string();
        ctx.register("database", move |_| {
            let url = url.clone();
            async move { Ok(Resolution::value(Database { url })) }
        })?
        .add_to_group("infrastructure")?;
        Ok(())
    }
}

struct RepositoryModule {
    created: Arc<AtomicUsize>,
}

impl Bootstrapper for RepositoryModule {
    fn bootstrap(&self, ctx: &BootstrapContext<'_>) -> ContainerResult<()> {
        ctx.register_factory(
            "users",
            ["database"],
            RepositoryFactory {
                created: self.created.clone(),
            },
        )?;
        ctx.add_to_group("repositories", "users")
    }
}

#[tokio::test]
async fn test_bootstrap_closure_registers_services() -> anyhow::Result<()> {
    let container = ServiceContainer::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let observer = seen.clone();

    container.bootstrap(|ctx| {
        ctx.register("greeting", |_| async { Ok(Resolution::value("hello")) })?;
        ctx.register_with("message", ["greeting"], |locator| async move {
            let greeting = locator.get_as::<&'static str>("greeting")?;
            Ok(Resolution::value(format!("{greeting}, world")))
        })?;
        ctx.resolved("message", move |_, _| {
            observer.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    })?;

    let message = container.resolve_as::<String>("message").await?;
    assert_eq!(message.as_str(), "hello, world");
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_bootstrap_all_runs_modules_in_order() -> anyhow::Result<()> {
    let container = ServiceContainer::new();
    let created = Arc::new(AtomicUsize::new(0));

    container.bootstrap_all([
        Box::new(DatabaseModule {
            url: "postgres://localhost/app",
        }) as Box<dyn Bootstrapper>,
        Box::new(RepositoryModule {
            created: created.clone(),
        }),
    ])?;

    assert_eq!(
        container.group_members("infrastructure"),
        Some(vec!["database".to_string()])
    );

    let repositories = container.resolve("repositories").await?;
    let users = repositories
        .member("users")
        .and_then(|member| member.downcast::<UserRepository>())
        .expect("users 应当已解析");
    assert_eq!(users.database.url, "postgres://localhost/app");

    let database = container.resolve_as::<Database>("database").await?;
    assert!(Arc::ptr_eq(&database, &users.database));
    assert_eq!(created.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_bootstrap_all_stops_at_first_failure() {
    let container = ServiceContainer::new();
    container.add_to_group("database", "other").unwrap();

    let later = Arc::new(AtomicUsize::new(0));
    let counter = later.clone();
    let result = container.bootstrap_all([
        Box::new(DatabaseModule { url: "sqlite::memory:" }) as Box<dyn Bootstrapper>,
        Box::new(move |_: &BootstrapContext<'_>| -> ContainerResult<()> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    ]);

    assert!(matches!(
        result,
        Err(ContainerError::DuplicateGroupConflict { .. })
    ));
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[test]
fn test_container_config_from_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(file, "enable_circular_dependency_detection = true").unwrap();
    writeln!(file, "max_resolution_depth = 8").unwrap();

    let config = ContainerConfig::load(Some(file.path())).unwrap();
    assert!(config.enable_circular_dependency_detection);
    assert_eq!(config.max_resolution_depth, 8);
    assert!(!config.fire_late_callbacks);

    let container = ServiceContainer::with_config(config);
    assert_eq!(container.settings().max_resolution_depth, 8);
}

#[derive(Debug, Deserialize, PartialEq)]
struct DatabaseOptions {
    url: String,
    #[serde(default)]
    pool_size: u32,
}

#[tokio::test]
async fn test_options_bind_and_feed_factories() -> anyhow::Result<()> {
    let options = ConfigSection::from_value(serde_json::json!({
        "url": "postgres://db/app",
        "pool_size": 4
    }))?;
    let container = ServiceContainer::builder().options(options).build();

    let bound: DatabaseOptions = container.bind_options()?;
    assert_eq!(
        bound,
        DatabaseOptions {
            url: "postgres://db/app".to_string(),
            pool_size: 4,
        }
    );

    container.register("database", |locator| async move {
        let options: DatabaseOptions = locator.config().bind()?;
        Ok(Resolution::value(Database { url: options.url }))
    })?;

    let database = container.resolve_as::<Database>("database").await?;
    assert_eq!(database.url, "postgres://db/app");
    Ok(())
}
