//! # 服务容器实现
//!
//! 按名称注册和解析服务的异步容器：
//!
//! - 服务只解析一次，之后从缓存返回
//! - 依赖按声明顺序先于工厂解析
//! - 服务组按加入顺序收集成员
//! - 解析完成回调在名称首次解析时执行一次
//!
//! ```ignore
//! let container = ServiceContainer::new();
//! container.register("baz", |_| async { Ok(Resolution::value(42_u32)) })?;
//! container.register_with("foo", ["baz"], |locator| async move {
//!     let baz = locator.get_as::<u32>("baz")?;
//!     Ok(Resolution::value(*baz + 1))
//! })?;
//!
//! let foo = container.resolve_as::<u32>("foo").await?;
//! ```

mod bootstrap;
mod callbacks;
mod container;
mod group;
mod registry;
mod resolution;

pub use bootstrap::{BootstrapContext, Bootstrapper};
pub use container::{ContainerStats, RegistrationHandle, ServiceContainer, ServiceContainerBuilder};

pub use di_abstractions::{
    FnFactory, Resolution, Resolved, Service, ServiceFactory, ServiceLocator, ServiceLocatorExt,
    ServiceLocatorRef, SyncFactory,
};
pub use infrastructure_common::{BoxError, ContainerConfig, ContainerError, ContainerResult};

#[cfg(test)]
mod tests;
