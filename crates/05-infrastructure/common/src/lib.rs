//! # Infrastructure Common
//!
//! 服务容器各 crate 共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`ContainerError`] - 服务容器错误分类
//! - [`ConfigSection`] - 容器键值选项
//! - [`ContainerConfig`] - 解析引擎配置
//! - [`LoggingConfig`] / [`init_logging`] - 日志初始化

pub mod configuration;
pub mod errors;
pub mod logging;

pub use configuration::*;
pub use errors::*;
pub use logging::*;
