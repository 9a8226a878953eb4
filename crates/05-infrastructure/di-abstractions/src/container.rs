//! 服务定位器抽象接口
//!
//! 容器对外的显式接口：按名称读取、设置与解析服务

use crate::factory::Service;
use crate::resolver::Resolved;
use async_trait::async_trait;
use infrastructure_common::{BoxError, ConfigSection, ContainerError, ContainerResult};
use std::any::Any;
use std::sync::Arc;

/// 共享的服务定位器
pub type ServiceLocatorRef = Arc<dyn ServiceLocator>;

/// 解析完成回调
pub type ResolvedCallback =
    Arc<dyn Fn(&dyn ServiceLocator, &Resolved) -> Result<(), BoxError> + Send + Sync>;

/// 服务定位器 trait
#[async_trait]
pub trait ServiceLocator: Send + Sync {
    /// 同步读取已解析的服务，未解析时返回 [`ContainerError::UnregisteredService`]
    fn get(&self, name: &str) -> ContainerResult<Service>;

    /// 直接设置已解析的服务，绕过工厂与依赖解析
    fn set(&self, name: &str, service: Service) -> ContainerResult<()>;

    /// 是否已解析
    fn is_resolved(&self, name: &str) -> bool;

    /// 是否已注册为服务
    fn is_registered(&self, name: &str) -> bool;

    /// 是否为服务组
    fn is_group(&self, name: &str) -> bool;

    /// 解析服务或服务组
    async fn resolve(&self, name: &str) -> ContainerResult<Resolved>;

    /// 等价于 [`ServiceLocator::resolve`]
    async fn call(&self, name: &str) -> ContainerResult<Resolved> {
        self.resolve(name).await
    }

    /// 容器选项快照
    fn config(&self) -> ConfigSection;
}

/// 类型化访问扩展
#[async_trait]
pub trait ServiceLocatorExt: ServiceLocator {
    /// 读取已解析的服务并转换为具体类型
    fn get_as<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        downcast_service(name, self.get(name)?)
    }

    /// 以具体值直接设置服务
    fn set_value<T: Any + Send + Sync>(&self, name: &str, value: T) -> ContainerResult<()> {
        self.set(name, Arc::new(value))
    }

    /// 解析服务并转换为具体类型
    async fn resolve_as<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        let service = self
            .resolve(name)
            .await?
            .into_service()
            .ok_or_else(|| ContainerError::NotAService {
                name: name.to_string(),
            })?;
        downcast_service(name, service)
    }
}

impl<L: ServiceLocator + ?Sized> ServiceLocatorExt for L {}

/// 向下转型，失败时返回类型不匹配错误
pub fn downcast_service<T: Any + Send + Sync>(name: &str, service: Service) -> ContainerResult<Arc<T>> {
    service
        .downcast::<T>()
        .map_err(|_| ContainerError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
}
