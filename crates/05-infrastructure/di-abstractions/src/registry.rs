//! 注册表条目与依赖图检查

use crate::factory::ServiceFactory;
use infrastructure_common::{ContainerError, ContainerResult, EntryKind};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// 服务注册信息
#[derive(Clone)]
pub struct ServiceSpec {
    /// 服务名称
    pub name: String,
    /// 依赖的服务名称，按解析顺序排列
    pub dependencies: Vec<String>,
    /// 服务工厂
    pub factory: Arc<dyn ServiceFactory>,
}

impl ServiceSpec {
    pub fn new(
        name: impl Into<String>,
        dependencies: Vec<String>,
        factory: Arc<dyn ServiceFactory>,
    ) -> Self {
        Self {
            name: name.into(),
            dependencies,
            factory,
        }
    }
}

impl fmt::Debug for ServiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSpec")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("factory", &"<function>")
            .finish()
    }
}

/// 注册表条目
///
/// 服务与服务组共享同一命名空间
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    /// 普通服务
    Leaf(ServiceSpec),
    /// 服务组，成员不重复且只增不减
    Group(Vec<String>),
}

impl RegistryEntry {
    /// 条目类型
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Leaf(_) => EntryKind::Service,
            Self::Group(_) => EntryKind::Group,
        }
    }

    /// 解析前需要先解析的名称
    pub fn edges(&self) -> &[String] {
        match self {
            Self::Leaf(spec) => &spec.dependencies,
            Self::Group(members) => members,
        }
    }
}

/// 依赖图节点
#[derive(Debug, Clone)]
pub struct DependencyGraphNode {
    /// 名称
    pub name: String,
    /// 依赖的名称列表
    pub dependencies: Vec<String>,
}

impl DependencyGraphNode {
    /// 从注册表条目构建节点
    pub fn from_entry(name: impl Into<String>, entry: &RegistryEntry) -> Self {
        Self {
            name: name.into(),
            dependencies: entry.edges().to_vec(),
        }
    }
}

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 检测循环依赖
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> ContainerResult<()>;
}

/// 默认循环依赖检测器
#[derive(Debug, Default)]
pub struct DefaultCircularDependencyDetector;

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> ContainerResult<()> {
        let index: HashMap<&str, &DependencyGraphNode> =
            graph.iter().map(|node| (node.name.as_str(), node)).collect();
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        for node in graph {
            if !visited.contains(node.name.as_str()) {
                Self::dfs_check(&node.name, &index, &mut visited, &mut path)?;
            }
        }

        Ok(())
    }
}

impl DefaultCircularDependencyDetector {
    fn dfs_check<'a>(
        current: &'a str,
        index: &HashMap<&'a str, &'a DependencyGraphNode>,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> ContainerResult<()> {
        if let Some(start) = path.iter().position(|name| *name == current) {
            let mut cycle = path[start..].to_vec();
            cycle.push(current);
            return Err(ContainerError::CircularDependency {
                dependency_chain: cycle.join(" -> "),
            });
        }

        if visited.contains(current) {
            return Ok(());
        }

        path.push(current);

        // 未注册的名称没有出边
        if let Some(&node) = index.get(current) {
            for dep in &node.dependencies {
                Self::dfs_check(dep, index, visited, path)?;
            }
        }

        path.pop();
        visited.insert(current);

        Ok(())
    }
}
