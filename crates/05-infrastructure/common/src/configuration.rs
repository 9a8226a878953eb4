//! 配置相关定义
//!
//! - [`ConfigSection`] 容器的键值选项，与服务解析无关
//! - [`ContainerConfig`] 解析引擎本身的行为开关

use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "SERVICE_CONTAINER";

/// 配置节
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSection {
    /// 配置数据
    pub data: HashMap<String, serde_json::Value>,
}

impl ConfigSection {
    /// 创建新的配置节
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// 从 JSON 对象创建配置节，非对象值返回类型错误
    pub fn from_value(value: serde_json::Value) -> ConfigResult<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(Self {
                data: map.into_iter().collect(),
            }),
            other => Err(ConfigError::ParseError {
                source: format!("配置节必须是对象, 实际为: {other}").into(),
            }),
        }
    }

    /// 插入配置项，返回旧值
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.data.insert(key.into(), value)
    }

    /// 获取配置项
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// 配置项数量
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 合并另一个配置节，同名键以 `other` 为准
    pub fn merge(&mut self, other: Self) {
        self.data.extend(other.data);
    }

    /// 绑定到具体类型
    pub fn bind<T>(&self) -> ConfigResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = serde_json::Value::Object(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );

        serde_json::from_value(value).map_err(|e| ConfigError::SerializationError { source: e })
    }

    /// 绑定单个配置项到具体类型
    pub fn bind_key<T>(&self, key: &str) -> ConfigResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self.get(key).cloned().ok_or_else(|| ConfigError::KeyNotFound {
            key: key.to_string(),
        })?;

        serde_json::from_value(value).map_err(|e| ConfigError::SerializationError { source: e })
    }
}

/// 服务容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用循环依赖检测（严格模式）
    pub enable_circular_dependency_detection: bool,
    /// 最大解析深度，仅在严格模式下生效
    pub max_resolution_depth: usize,
    /// 服务已解析后再注册的回调是否立即执行
    pub fire_late_callbacks: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_circular_dependency_detection: false,
            max_resolution_depth: 100,
            fire_late_callbacks: false,
        }
    }
}

impl ContainerConfig {
    /// 严格模式配置：启用循环依赖检测
    pub fn strict() -> Self {
        Self {
            enable_circular_dependency_detection: true,
            ..Self::default()
        }
    }

    /// 加载配置
    ///
    /// 可选的配置文件（toml/json/yaml）作为底层，`SERVICE_CONTAINER__*` 环境变量覆盖其上。
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("加载服务容器配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| {
                error!("配置构建失败: {}", e);
                ConfigError::ParseError {
                    source: Box::new(e),
                }
            })?;

        let config: Self = settings.try_deserialize().map_err(|e| {
            error!("配置绑定失败: {}", e);
            ConfigError::ParseError {
                source: Box::new(e),
            }
        })?;

        debug!("服务容器配置加载完成: {:?}", config);
        Ok(config)
    }
}
