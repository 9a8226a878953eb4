//! # Dependency Injection Abstractions
//!
//! 服务容器抽象层，定义服务注册与按名称解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ServiceLocator`] - 服务定位器接口
//! - [`ServiceFactory`] - 服务工厂接口
//! - [`RegistryEntry`] - 注册表条目（服务或服务组）
//! - [`ResolveContext`] - 依赖解析上下文

pub mod container;
pub mod factory;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use factory::*;
pub use registry::*;
pub use resolver::*;
