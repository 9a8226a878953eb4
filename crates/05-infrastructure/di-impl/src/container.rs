//! 服务容器
//!
//! 注册表、已解析服务缓存、回调和容器选项都归容器所有，外部只能通过这里的操作访问。

use crate::callbacks::CallbackRegistry;
use crate::registry::ServiceRegistry;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use di_abstractions::{
    downcast_service, CircularDependencyDetector, DefaultCircularDependencyDetector, FnFactory,
    Resolution, Resolved, ResolvedCallback, Service, ServiceFactory, ServiceLocator, ServiceLocatorRef,
    ServiceSpec, SyncFactory,
};
use infrastructure_common::{
    BoxError, ConfigResult, ConfigSection, ContainerConfig, ContainerError, ContainerResult,
    EntryKind,
};
use parking_lot::RwLock;
use serde::Deserialize;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

pub(crate) struct ContainerInner {
    pub(crate) config: ContainerConfig,
    pub(crate) registry: ServiceRegistry,
    /// 已解析服务，条目存在即视为已解析
    pub(crate) resolved: DashMap<String, Service>,
    pub(crate) callbacks: CallbackRegistry,
    /// 每个名称的解析槽位，保证工厂至多执行一次、回调只触发一次
    pub(crate) slots: DashMap<String, Arc<OnceCell<()>>>,
    options: RwLock<ConfigSection>,
}

/// 服务容器
///
/// 克隆得到的是同一个容器的句柄。
#[derive(Clone)]
pub struct ServiceContainer {
    pub(crate) inner: Arc<ContainerInner>,
}

impl ServiceContainer {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// 创建构建器
    pub fn builder() -> ServiceContainerBuilder {
        ServiceContainerBuilder::new()
    }

    /// 解析引擎配置
    pub fn settings(&self) -> &ContainerConfig {
        &self.inner.config
    }

    /// 注册无依赖的服务
    pub fn register<N, F, Fut>(&self, name: N, factory: F) -> ContainerResult<RegistrationHandle<'_>>
    where
        N: Into<String>,
        F: Fn(ServiceLocatorRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resolution, BoxError>> + Send + 'static,
    {
        self.register_factory(name, Vec::<String>::new(), FnFactory::new(factory))
    }

    /// 注册带依赖的服务，依赖按给定顺序先于工厂解析
    pub fn register_with<N, I, S, F, Fut>(
        &self,
        name: N,
        dependencies: I,
        factory: F,
    ) -> ContainerResult<RegistrationHandle<'_>>
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(ServiceLocatorRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resolution, BoxError>> + Send + 'static,
    {
        self.register_factory(name, dependencies, FnFactory::new(factory))
    }

    /// 注册自定义工厂
    ///
    /// 同名服务后注册的覆盖先注册的，已注册的回调保留；名称已是服务组时返回冲突错误。
    pub fn register_factory<N, I, S, T>(
        &self,
        name: N,
        dependencies: I,
        factory: T,
    ) -> ContainerResult<RegistrationHandle<'_>>
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: ServiceFactory + 'static,
    {
        let name = name.into();
        let dependencies = dependencies.into_iter().map(Into::into).collect();
        self.inner
            .registry
            .insert_service(ServiceSpec::new(name.clone(), dependencies, Arc::new(factory)))?;
        Ok(RegistrationHandle {
            container: self,
            name,
        })
    }

    /// 批量同步注册
    ///
    /// 按迭代顺序注册为无依赖服务并立即执行工厂，返回后即可通过 [`ServiceContainer::get`] 读取。
    pub fn register_all<I, N>(&self, entries: I) -> ContainerResult<()>
    where
        I: IntoIterator<Item = (N, SyncFactory)>,
        N: Into<String>,
    {
        for (name, factory) in entries {
            let name = name.into();
            self.register_factory(name.as_str(), Vec::<String>::new(), factory.clone())?;
            self.resolve_sync(&name, &factory)?;
        }
        Ok(())
    }

    fn resolve_sync(&self, name: &str, factory: &SyncFactory) -> ContainerResult<()> {
        if self.is_resolved(name) {
            return Ok(());
        }

        let service = factory
            .call(self)
            .map_err(|source| {
                error!("服务工厂执行失败: {}: {}", name, source);
                ContainerError::FactoryFailed {
                    name: name.to_string(),
                    source,
                }
            })?
            .into_service();

        match self.inner.resolved.entry(name.to_string()) {
            Entry::Occupied(_) => {
                debug!("服务已由其他路径解析，保留已有值: {}", name);
                return Ok(());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(service.clone());
            }
        }

        // 异步解析进行中时由其完成槽位并执行回调
        if self.slot(name).set(()).is_err() {
            debug!("服务正在异步解析，回调交由其执行: {}", name);
            return Ok(());
        }
        self.inner
            .callbacks
            .fire(name, self, &Resolved::Service(service))
    }

    /// 将服务加入服务组
    ///
    /// 首次使用时创建服务组，重复加入不产生效果。
    pub fn add_to_group(&self, group: &str, service: &str) -> ContainerResult<()> {
        if !self.inner.registry.is_group(group)
            && (self.inner.registry.is_service(group) || self.is_resolved(group))
        {
            warn!("服务组名称与服务冲突: {}", group);
            return Err(ContainerError::conflict(group, EntryKind::Service));
        }
        self.inner.registry.add_to_group(group, service)?;
        Ok(())
    }

    /// 服务组成员，按加入顺序排列
    pub fn group_members(&self, group: &str) -> Option<Vec<String>> {
        self.inner.registry.group_members(group)
    }

    /// 注册解析完成回调
    ///
    /// 回调在名称首次变为已解析时按注册顺序执行一次。名称已解析后再注册的回调默认不会执行，
    /// 除非启用了 `fire_late_callbacks`。
    pub fn resolved<F>(&self, name: &str, callback: F) -> ContainerResult<()>
    where
        F: Fn(&dyn ServiceLocator, &Resolved) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let callback: ResolvedCallback = Arc::new(callback);
        self.inner.callbacks.push(name, callback.clone());

        if self.inner.config.fire_late_callbacks {
            if let Some(service) = self.cached(name) {
                debug!("服务已解析，立即执行回调: {}", name);
                return CallbackRegistry::fire_one(
                    name,
                    &callback,
                    self,
                    &Resolved::Service(service),
                );
            }
        }
        Ok(())
    }

    /// 同步读取已解析的服务
    pub fn get(&self, name: &str) -> ContainerResult<Service> {
        self.cached(name)
            .ok_or_else(|| ContainerError::unregistered(name))
    }

    /// 读取已解析的服务并转换为具体类型
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        downcast_service(name, self.get(name)?)
    }

    /// 直接设置已解析的服务
    ///
    /// 不经过工厂与依赖解析，也不触发回调。名称已是服务组时返回冲突错误。
    /// 设置时该名称的异步解析仍在进行的，解析结束后保留这里设置的值。
    pub fn set(&self, name: &str, service: Service) -> ContainerResult<()> {
        if self.inner.registry.is_group(name) {
            warn!("服务名称与服务组冲突: {}", name);
            return Err(ContainerError::conflict(name, EntryKind::Group));
        }
        debug!("直接设置服务: {}", name);
        self.inner.resolved.insert(name.to_string(), service);
        Ok(())
    }

    /// 以具体值直接设置服务
    pub fn set_value<T: Any + Send + Sync>(&self, name: &str, value: T) -> ContainerResult<()> {
        self.set(name, Arc::new(value))
    }

    /// 是否已解析
    pub fn is_resolved(&self, name: &str) -> bool {
        self.inner.resolved.contains_key(name)
    }

    /// 是否已注册为服务
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.registry.is_service(name)
    }

    /// 是否为服务组
    pub fn is_group(&self, name: &str) -> bool {
        self.inner.registry.is_group(name)
    }

    /// 已注册的服务和服务组名称
    pub fn registered_names(&self) -> Vec<String> {
        self.inner.registry.names()
    }

    /// 容器选项快照
    pub fn config(&self) -> ConfigSection {
        self.inner.options.read().clone()
    }

    /// 读取单个选项
    pub fn option(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.options.read().get(key).cloned()
    }

    /// 设置单个选项，返回旧值
    pub fn set_option(
        &self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.inner.options.write().insert(key, value)
    }

    /// 将选项绑定到具体类型
    pub fn bind_options<T>(&self) -> ConfigResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.inner.options.read().bind()
    }

    /// 静态检查已注册的依赖图（依赖与服务组成员）是否存在循环
    pub fn validate(&self) -> ContainerResult<()> {
        let graph = self.inner.registry.dependency_graph();
        debug!("验证依赖关系图: {} 个节点", graph.len());
        DefaultCircularDependencyDetector.detect_circular_dependencies(&graph)
    }

    /// 容器统计信息
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_services: self.inner.registry.count(EntryKind::Service),
            registered_groups: self.inner.registry.count(EntryKind::Group),
            resolved_services: self.inner.resolved.len(),
            callbacks: self.inner.callbacks.count(),
        }
    }

    /// 某个名称上注册的回调数量
    pub fn callback_count(&self, name: &str) -> usize {
        self.inner.callbacks.count_for(name)
    }

    pub(crate) fn cached(&self, name: &str) -> Option<Service> {
        self.inner
            .resolved
            .get(name)
            .map(|service| service.value().clone())
    }

    pub(crate) fn slot(&self, name: &str) -> Arc<OnceCell<()>> {
        self.inner
            .slots
            .entry(name.to_string())
            .or_default()
            .value()
            .clone()
    }

    pub(crate) fn locator(&self) -> ServiceLocatorRef {
        Arc::new(self.clone())
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("config", &self.inner.config)
            .field("registered", &self.registered_names())
            .field("resolved", &self.inner.resolved.len())
            .finish()
    }
}

#[async_trait]
impl ServiceLocator for ServiceContainer {
    fn get(&self, name: &str) -> ContainerResult<Service> {
        Self::get(self, name)
    }

    fn set(&self, name: &str, service: Service) -> ContainerResult<()> {
        Self::set(self, name, service)
    }

    fn is_resolved(&self, name: &str) -> bool {
        Self::is_resolved(self, name)
    }

    fn is_registered(&self, name: &str) -> bool {
        Self::is_registered(self, name)
    }

    fn is_group(&self, name: &str) -> bool {
        Self::is_group(self, name)
    }

    async fn resolve(&self, name: &str) -> ContainerResult<Resolved> {
        Self::resolve(self, name).await
    }

    fn config(&self) -> ConfigSection {
        Self::config(self)
    }
}

/// 容器构建器
#[derive(Debug, Default)]
pub struct ServiceContainerBuilder {
    config: ContainerConfig,
    options: ConfigSection,
}

impl ServiceContainerBuilder {
    /// 创建默认构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置解析引擎配置
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置初始选项
    pub fn options(mut self, options: ConfigSection) -> Self {
        self.options.merge(options);
        self
    }

    /// 添加单个初始选项
    pub fn option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key, value);
        self
    }

    /// 构建容器
    pub fn build(self) -> ServiceContainer {
        debug!("构建服务容器: {:?}", self.config);
        ServiceContainer {
            inner: Arc::new(ContainerInner {
                config: self.config,
                registry: ServiceRegistry::default(),
                resolved: DashMap::new(),
                callbacks: CallbackRegistry::default(),
                slots: DashMap::new(),
                options: RwLock::new(self.options),
            }),
        }
    }
}

/// 注册句柄
#[derive(Debug)]
pub struct RegistrationHandle<'a> {
    container: &'a ServiceContainer,
    name: String,
}

impl<'a> RegistrationHandle<'a> {
    /// 注册的服务名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 将刚注册的服务加入服务组
    pub fn add_to_group(&self, group: &str) -> ContainerResult<&Self> {
        self.container.add_to_group(group, &self.name)?;
        Ok(self)
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已注册服务数量
    pub registered_services: usize,
    /// 服务组数量
    pub registered_groups: usize,
    /// 已解析服务数量
    pub resolved_services: usize,
    /// 已注册回调数量
    pub callbacks: usize,
}
