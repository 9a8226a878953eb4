//! 解析引擎
//!
//! 按名称解析服务：先查服务组，再查缓存，最后按依赖顺序解析并执行工厂。
//! 同一名称的并发解析共享一个槽位，工厂至多执行一次，回调在值写入缓存后执行一次。

use crate::container::ServiceContainer;
use di_abstractions::{
    downcast_service, ResolveContext, ResolveOptions, Resolved, Service, ServiceSpec,
};
use futures::future::BoxFuture;
use infrastructure_common::{ContainerError, ContainerResult};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error, info};

impl ServiceContainer {
    /// 解析服务或服务组
    ///
    /// 已解析的服务直接返回缓存值；服务组每次都重新收集成员。
    pub async fn resolve(&self, name: &str) -> ContainerResult<Resolved> {
        let options = ResolveOptions::from(self.inner.config.clone());
        self.resolve_in(name.to_string(), ResolveContext::new(options))
            .await
    }

    /// 等价于 [`ServiceContainer::resolve`]
    pub async fn call(&self, name: &str) -> ContainerResult<Resolved> {
        self.resolve(name).await
    }

    /// 解析服务并转换为具体类型
    pub async fn resolve_as<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        let service = self
            .resolve(name)
            .await?
            .into_service()
            .ok_or_else(|| ContainerError::NotAService {
                name: name.to_string(),
            })?;
        downcast_service(name, service)
    }

    pub(crate) fn resolve_in(
        &self,
        name: String,
        ctx: ResolveContext,
    ) -> BoxFuture<'static, ContainerResult<Resolved>> {
        let this = self.clone();
        Box::pin(async move {
            if this.inner.registry.is_group(&name) {
                return this.resolve_group(&name, &ctx).await;
            }
            this.resolve_service(&name, &ctx)
                .await
                .map(Resolved::Service)
        })
    }

    async fn resolve_service(&self, name: &str, ctx: &ResolveContext) -> ContainerResult<Service> {
        if let Some(service) = self.cached(name) {
            debug!("命中已解析服务: {}", name);
            return Ok(service);
        }
        if !self.inner.registry.is_service(name) {
            return Err(ContainerError::unregistered(name));
        }

        let ctx = ctx.enter(name)?;
        let slot = self.slot(name);
        let mut fired = Ok(());
        let outcome = &mut fired;

        slot.get_or_try_init(|| async move {
            // 等待槽位期间可能已由同步注册或直接设置写入
            if self.is_resolved(name) {
                return Ok(());
            }

            let spec = self
                .inner
                .registry
                .service_spec(name)
                .ok_or_else(|| ContainerError::unregistered(name))?;
            self.resolve_dependencies(&spec, &ctx).await?;

            info!("创建服务: {}", name);
            let created = spec.factory.create(self.locator()).await;

            // 工厂执行期间可能已由直接设置或批量注册写入，先写入者为准
            let service = match self.cached(name) {
                Some(existing) => {
                    debug!("服务已由其他路径写入，保留已有值: {}", name);
                    existing
                }
                None => {
                    let service = created
                        .map_err(|source| {
                            error!("服务工厂执行失败: {}: {}", name, source);
                            ContainerError::FactoryFailed {
                                name: name.to_string(),
                                source,
                            }
                        })?
                        .into_service();
                    self.inner
                        .resolved
                        .entry(name.to_string())
                        .or_insert(service)
                        .value()
                        .clone()
                }
            };

            *outcome = self
                .inner
                .callbacks
                .fire(name, self, &Resolved::Service(service));
            Ok::<(), ContainerError>(())
        })
        .await?;

        fired?;
        self.get(name)
    }

    /// 按声明顺序逐个解析依赖
    async fn resolve_dependencies(
        &self,
        spec: &ServiceSpec,
        ctx: &ResolveContext,
    ) -> ContainerResult<()> {
        for dependency in &spec.dependencies {
            debug!("解析依赖: {} -> {}", spec.name, dependency);
            self.resolve_in(dependency.clone(), ctx.clone()).await?;
        }
        Ok(())
    }
}
