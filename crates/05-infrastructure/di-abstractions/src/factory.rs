//! 服务工厂抽象接口
//!
//! 工厂通过声明的返回值 [`Resolution`] 区分普通值与模块式值（`default` 字段）。

use crate::container::{ServiceLocator, ServiceLocatorRef};
use async_trait::async_trait;
use infrastructure_common::BoxError;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// 类型擦除后的服务值
pub type Service = Arc<dyn Any + Send + Sync>;

/// 工厂产出
pub enum Resolution {
    /// 服务值本身
    Value(Service),
    /// 模块式产出，`default` 字段才是真正的服务值
    Module {
        /// 模块默认导出
        default: Service,
    },
}

impl Resolution {
    /// 包装普通值
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    /// 包装模块式产出
    pub fn module<T: Any + Send + Sync>(default: T) -> Self {
        Self::Module {
            default: Arc::new(default),
        }
    }

    /// 包装已共享的服务值
    pub fn shared(service: Service) -> Self {
        Self::Value(service)
    }

    /// 取出服务值，模块式产出解包 `default`
    pub fn into_service(self) -> Service {
        match self {
            Self::Value(service) | Self::Module { default: service } => service,
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Resolution::Value(<service>)"),
            Self::Module { .. } => f.write_str("Resolution::Module { default: <service> }"),
        }
    }
}

/// 服务工厂 trait
///
/// 接收容器本身，异步产出服务值
#[async_trait]
pub trait ServiceFactory: Send + Sync {
    /// 创建服务
    async fn create(&self, locator: ServiceLocatorRef) -> Result<Resolution, BoxError>;
}

/// 异步闭包工厂
pub struct FnFactory<F> {
    factory_fn: F,
}

impl<F, Fut> FnFactory<F>
where
    F: Fn(ServiceLocatorRef) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resolution, BoxError>> + Send + 'static,
{
    /// 包装异步闭包
    pub fn new(factory_fn: F) -> Self {
        Self { factory_fn }
    }
}

#[async_trait]
impl<F, Fut> ServiceFactory for FnFactory<F>
where
    F: Fn(ServiceLocatorRef) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resolution, BoxError>> + Send + 'static,
{
    async fn create(&self, locator: ServiceLocatorRef) -> Result<Resolution, BoxError> {
        (self.factory_fn)(locator).await
    }
}

/// 同步工厂函数类型
pub type SyncFactoryFn =
    Arc<dyn Fn(&dyn ServiceLocator) -> Result<Resolution, BoxError> + Send + Sync>;

/// 同步工厂
///
/// 批量注册使用，注册时立即执行并返回最终值
#[derive(Clone)]
pub struct SyncFactory {
    factory_fn: SyncFactoryFn,
}

impl SyncFactory {
    /// 包装同步闭包
    pub fn new<F>(factory_fn: F) -> Self
    where
        F: Fn(&dyn ServiceLocator) -> Result<Resolution, BoxError> + Send + Sync + 'static,
    {
        Self {
            factory_fn: Arc::new(factory_fn),
        }
    }

    /// 总是返回同一个值的工厂
    pub fn constant<T: Any + Send + Sync>(value: T) -> Self {
        let service: Service = Arc::new(value);
        Self::new(move |_| Ok(Resolution::shared(service.clone())))
    }

    /// 同步执行
    pub fn call(&self, locator: &dyn ServiceLocator) -> Result<Resolution, BoxError> {
        (self.factory_fn)(locator)
    }
}

impl fmt::Debug for SyncFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncFactory")
            .field("factory_fn", &"<function>")
            .finish()
    }
}

#[async_trait]
impl ServiceFactory for SyncFactory {
    async fn create(&self, locator: ServiceLocatorRef) -> Result<Resolution, BoxError> {
        self.call(&*locator)
    }
}
