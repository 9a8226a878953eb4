//! 启动引导
//!
//! 引导函数拿到受限的注册视图，只能注册服务、加入服务组和订阅解析回调。

use crate::container::{RegistrationHandle, ServiceContainer};
use di_abstractions::{Resolution, Resolved, ServiceFactory, ServiceLocator, ServiceLocatorRef};
use infrastructure_common::{BoxError, ContainerResult};
use std::future::Future;
use tracing::{error, info};

/// 引导上下文
#[derive(Debug, Clone, Copy)]
pub struct BootstrapContext<'a> {
    container: &'a ServiceContainer,
}

impl<'a> BootstrapContext<'a> {
    pub(crate) fn new(container: &'a ServiceContainer) -> Self {
        Self { container }
    }

    /// 见 [`ServiceContainer::register`]
    pub fn register<N, F, Fut>(&self, name: N, factory: F) -> ContainerResult<RegistrationHandle<'a>>
    where
        N: Into<String>,
        F: Fn(ServiceLocatorRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resolution, BoxError>> + Send + 'static,
    {
        self.container.register(name, factory)
    }

    /// 见 [`ServiceContainer::register_with`]
    pub fn register_with<N, I, S, F, Fut>(
        &self,
        name: N,
        dependencies: I,
        factory: F,
    ) -> ContainerResult<RegistrationHandle<'a>>
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(ServiceLocatorRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resolution, BoxError>> + Send + 'static,
    {
        self.container.register_with(name, dependencies, factory)
    }

    /// 见 [`ServiceContainer::register_factory`]
    pub fn register_factory<N, I, S, T>(
        &self,
        name: N,
        dependencies: I,
        factory: T,
    ) -> ContainerResult<RegistrationHandle<'a>>
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: ServiceFactory + 'static,
    {
        self.container.register_factory(name, dependencies, factory)
    }

    /// 见 [`ServiceContainer::add_to_group`]
    pub fn add_to_group(&self, group: &str, service: &str) -> ContainerResult<()> {
        self.container.add_to_group(group, service)
    }

    /// 见 [`ServiceContainer::resolved`]
    pub fn resolved<F>(&self, name: &str, callback: F) -> ContainerResult<()>
    where
        F: Fn(&dyn ServiceLocator, &Resolved) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.container.resolved(name, callback)
    }
}

/// 可复用的引导单元
pub trait Bootstrapper: Send + Sync {
    /// 向容器注册服务
    fn bootstrap(&self, ctx: &BootstrapContext<'_>) -> ContainerResult<()>;

    /// 用于日志的名称
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> Bootstrapper for F
where
    F: Fn(&BootstrapContext<'_>) -> ContainerResult<()> + Send + Sync,
{
    fn bootstrap(&self, ctx: &BootstrapContext<'_>) -> ContainerResult<()> {
        self(ctx)
    }
}

impl ServiceContainer {
    /// 同步执行引导函数
    pub fn bootstrap<F>(&self, bootstrap: F) -> ContainerResult<()>
    where
        F: FnOnce(&BootstrapContext<'_>) -> ContainerResult<()>,
    {
        bootstrap(&BootstrapContext::new(self))
    }

    /// 依次执行引导单元，第一个失败即停止
    pub fn bootstrap_all<I>(&self, bootstrappers: I) -> ContainerResult<()>
    where
        I: IntoIterator<Item = Box<dyn Bootstrapper>>,
    {
        let ctx = BootstrapContext::new(self);
        for bootstrapper in bootstrappers {
            info!("执行引导: {}", bootstrapper.name());
            bootstrapper.bootstrap(&ctx).map_err(|e| {
                error!("引导失败: {}: {}", bootstrapper.name(), e);
                e
            })?;
        }
        Ok(())
    }
}
