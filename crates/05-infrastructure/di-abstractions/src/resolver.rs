//! 解析结果与解析上下文

use crate::factory::Service;
use infrastructure_common::{ContainerConfig, ContainerError, ContainerResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 解析结果
#[derive(Clone)]
pub enum Resolved {
    /// 单个服务
    Service(Service),
    /// 服务组，成员按加入顺序排列
    Group {
        /// 组名
        name: String,
        /// 成员名及其解析结果
        members: Vec<(String, Resolved)>,
    },
}

impl Resolved {
    /// 是否为服务组
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }

    /// 单个服务值
    pub fn service(&self) -> Option<&Service> {
        match self {
            Self::Service(service) => Some(service),
            Self::Group { .. } => None,
        }
    }

    /// 取出单个服务值
    pub fn into_service(self) -> Option<Service> {
        match self {
            Self::Service(service) => Some(service),
            Self::Group { .. } => None,
        }
    }

    /// 向下转型为具体类型
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.service()
            .and_then(|service| service.clone().downcast::<T>().ok())
    }

    /// 服务组成员名
    pub fn member_names(&self) -> Vec<&str> {
        match self {
            Self::Service(_) => Vec::new(),
            Self::Group { members, .. } => members.iter().map(|(name, _)| name.as_str()).collect(),
        }
    }

    /// 按名称查找服务组成员
    pub fn member(&self, name: &str) -> Option<&Resolved> {
        match self {
            Self::Service(_) => None,
            Self::Group { members, .. } => members
                .iter()
                .find(|(member, _)| member == name)
                .map(|(_, resolved)| resolved),
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(_) => f.write_str("Resolved::Service(<service>)"),
            Self::Group { name, members } => f
                .debug_struct("Resolved::Group")
                .field("name", name)
                .field("members", members)
                .finish(),
        }
    }
}

/// 解析选项
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// 是否检测循环依赖
    pub detect_cycles: bool,
    /// 最大递归深度
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ContainerConfig::default().into()
    }
}

impl From<ContainerConfig> for ResolveOptions {
    fn from(config: ContainerConfig) -> Self {
        Self {
            detect_cycles: config.enable_circular_dependency_detection,
            max_depth: config.max_resolution_depth,
        }
    }
}

/// 解析上下文
///
/// 沿依赖链向下传递；未启用检测时只记录，不做任何检查
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 当前解析链，用于检测循环依赖
    pub resolution_chain: Vec<String>,
    /// 解析选项
    pub options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            resolution_chain: Vec::new(),
            options,
        }
    }

    /// 添加名称到解析链
    pub fn push_name(&mut self, name: &str) -> ContainerResult<()> {
        if self.options.detect_cycles {
            if self.resolution_chain.iter().any(|entry| entry == name) {
                return Err(ContainerError::CircularDependency {
                    dependency_chain: format!("{} -> {}", self.resolution_chain.join(" -> "), name),
                });
            }
            if self.resolution_chain.len() >= self.options.max_depth {
                return Err(ContainerError::ResolutionDepthExceeded {
                    name: name.to_string(),
                    max_depth: self.options.max_depth,
                });
            }
        }
        self.resolution_chain.push(name.to_string());
        Ok(())
    }

    /// 返回进入 `name` 之后的子上下文
    pub fn enter(&self, name: &str) -> ContainerResult<Self> {
        let mut child = self.clone();
        child.push_name(name)?;
        Ok(child)
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> ResolveContext {
        ResolveContext::new(ContainerConfig::strict().into())
    }

    #[test]
    fn test_cycle_detected_in_strict_mode() {
        let ctx = strict().enter("foo").unwrap().enter("bar").unwrap();
        let err = ctx.enter("foo").unwrap_err();

        match err {
            ContainerError::CircularDependency { dependency_chain } => {
                assert_eq!(dependency_chain, "foo -> bar -> foo");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_ignored_by_default() {
        let ctx = ResolveContext::default().enter("foo").unwrap();
        assert!(ctx.enter("foo").is_ok());
    }

    #[test]
    fn test_depth_limit() {
        let mut ctx = ResolveContext::new(ResolveOptions {
            detect_cycles: true,
            max_depth: 2,
        });
        ctx.push_name("a").unwrap();
        ctx.push_name("b").unwrap();

        assert!(matches!(
            ctx.push_name("c"),
            Err(ContainerError::ResolutionDepthExceeded { max_depth: 2, .. })
        ));
        assert_eq!(ctx.depth(), 2);
    }

    #[test]
    fn test_enter_leaves_parent_untouched() {
        let parent = strict().enter("foo").unwrap();
        let _child = parent.enter("bar").unwrap();
        assert_eq!(parent.resolution_chain, vec!["foo".to_string()]);
    }

    #[test]
    fn test_group_result_accessors() {
        let group = Resolved::Group {
            name: "admin".to_string(),
            members: vec![
                ("foo".to_string(), Resolved::Service(Arc::new(1_u8))),
                ("bar".to_string(), Resolved::Service(Arc::new("bar"))),
            ],
        };

        assert!(group.is_group());
        assert!(group.service().is_none());
        assert_eq!(group.member_names(), vec!["foo", "bar"]);
        assert_eq!(group.member("foo").and_then(|m| m.downcast::<u8>()).as_deref(), Some(&1));
        assert!(group.member("baz").is_none());
    }
}
