//! 解析回调注册表
//!
//! 每个名称一组只增不减的回调，按注册顺序执行。

use dashmap::DashMap;
use di_abstractions::{Resolved, ResolvedCallback, ServiceLocator};
use infrastructure_common::{ContainerError, ContainerResult};
use tracing::{debug, error};

#[derive(Default)]
pub(crate) struct CallbackRegistry {
    callbacks: DashMap<String, Vec<ResolvedCallback>>,
}

impl CallbackRegistry {
    pub(crate) fn push(&self, name: &str, callback: ResolvedCallback) {
        self.callbacks
            .entry(name.to_string())
            .or_default()
            .push(callback);
    }

    /// 按注册顺序执行 `name` 的回调，遇到第一个错误即停止
    pub(crate) fn fire(
        &self,
        name: &str,
        locator: &dyn ServiceLocator,
        resolved: &Resolved,
    ) -> ContainerResult<()> {
        // 先取快照，回调内部可以继续注册回调
        let callbacks = match self.callbacks.get(name) {
            Some(callbacks) => callbacks.value().clone(),
            None => return Ok(()),
        };

        debug!("执行解析回调: {} ({} 个)", name, callbacks.len());
        for callback in &callbacks {
            callback(locator, resolved).map_err(|source| {
                error!("解析回调执行失败: {}: {}", name, source);
                ContainerError::CallbackFailed {
                    name: name.to_string(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    /// 单独执行一个回调
    pub(crate) fn fire_one(
        name: &str,
        callback: &ResolvedCallback,
        locator: &dyn ServiceLocator,
        resolved: &Resolved,
    ) -> ContainerResult<()> {
        callback(locator, resolved).map_err(|source| ContainerError::CallbackFailed {
            name: name.to_string(),
            source,
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.callbacks.iter().map(|entry| entry.value().len()).sum()
    }

    pub(crate) fn count_for(&self, name: &str) -> usize {
        self.callbacks.get(name).map_or(0, |callbacks| callbacks.len())
    }
}
