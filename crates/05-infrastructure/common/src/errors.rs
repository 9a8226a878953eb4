//! 错误类型定义

use std::fmt;
use thiserror::Error;

/// 工厂与回调返回的通用错误类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 名称在容器中已占用的条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// 普通服务（注册的工厂或直接设置的值）
    Service,
    /// 服务组
    Group,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => f.write_str("服务"),
            Self::Group => f.write_str("服务组"),
        }
    }
}

/// 服务容器错误类型
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("服务未注册: {name}")]
    UnregisteredService { name: String },

    #[error("名称冲突: {name} 已作为{existing}使用")]
    DuplicateGroupConflict { name: String, existing: EntryKind },

    #[error("服务工厂执行失败: {name}, 原因: {source}")]
    FactoryFailed { name: String, source: BoxError },

    #[error("解析回调执行失败: {name}, 原因: {source}")]
    CallbackFailed { name: String, source: BoxError },

    #[error("服务类型不匹配: {name}, 期望 {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("{name} 是服务组，不是单个服务")]
    NotAService { name: String },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("解析深度超过限制: {name}, 最大深度 {max_depth}")]
    ResolutionDepthExceeded { name: String, max_depth: usize },
}

impl ContainerError {
    /// 创建服务未注册错误
    pub fn unregistered(name: impl Into<String>) -> Self {
        Self::UnregisteredService { name: name.into() }
    }

    /// 创建名称冲突错误
    pub fn conflict(name: impl Into<String>, existing: EntryKind) -> Self {
        Self::DuplicateGroupConflict {
            name: name.into(),
            existing,
        }
    }

    /// 是否为服务未注册错误
    pub fn is_unregistered(&self) -> bool {
        matches!(self, Self::UnregisteredService { .. })
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("服务容器错误: {source}")]
    ContainerError {
        #[from]
        source: ContainerError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ContainerResult<T> = Result<T, ContainerError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
