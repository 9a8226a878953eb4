//! 服务注册表
//!
//! 名称到 [`RegistryEntry`] 的映射，服务与服务组共享命名空间。

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use di_abstractions::{DependencyGraphNode, RegistryEntry, ServiceSpec};
use infrastructure_common::{ContainerError, ContainerResult, EntryKind};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub(crate) struct ServiceRegistry {
    entries: DashMap<String, RegistryEntry>,
}

impl ServiceRegistry {
    /// 注册或覆盖服务，名称已是服务组时拒绝
    pub(crate) fn insert_service(&self, spec: ServiceSpec) -> ContainerResult<()> {
        match self.entries.entry(spec.name.clone()) {
            Entry::Occupied(mut occupied) => {
                if let RegistryEntry::Group(_) = occupied.get() {
                    warn!("服务名称与服务组冲突: {}", spec.name);
                    return Err(ContainerError::conflict(spec.name, EntryKind::Group));
                }
                debug!("覆盖服务注册: {}", spec.name);
                occupied.insert(RegistryEntry::Leaf(spec));
            }
            Entry::Vacant(vacant) => {
                debug!("注册服务: {} (依赖: {:?})", spec.name, spec.dependencies);
                vacant.insert(RegistryEntry::Leaf(spec));
            }
        }
        Ok(())
    }

    /// 加入服务组，重复加入不产生效果
    ///
    /// 返回成员是否为新加入
    pub(crate) fn add_to_group(&self, group: &str, service: &str) -> ContainerResult<bool> {
        match self.entries.entry(group.to_string()) {
            Entry::Occupied(mut occupied) => match occupied.get_mut() {
                RegistryEntry::Group(members) => {
                    if members.iter().any(|member| member == service) {
                        return Ok(false);
                    }
                    members.push(service.to_string());
                }
                RegistryEntry::Leaf(_) => {
                    warn!("服务组名称与服务冲突: {}", group);
                    return Err(ContainerError::conflict(group, EntryKind::Service));
                }
            },
            Entry::Vacant(vacant) => {
                debug!("创建服务组: {}", group);
                vacant.insert(RegistryEntry::Group(vec![service.to_string()]));
            }
        }
        debug!("服务 {} 加入服务组 {}", service, group);
        Ok(true)
    }

    pub(crate) fn kind(&self, name: &str) -> Option<EntryKind> {
        self.entries.get(name).map(|entry| entry.kind())
    }

    pub(crate) fn is_group(&self, name: &str) -> bool {
        self.kind(name) == Some(EntryKind::Group)
    }

    pub(crate) fn is_service(&self, name: &str) -> bool {
        self.kind(name) == Some(EntryKind::Service)
    }

    /// 服务组成员快照
    pub(crate) fn group_members(&self, name: &str) -> Option<Vec<String>> {
        self.entries.get(name).and_then(|entry| match entry.value() {
            RegistryEntry::Group(members) => Some(members.clone()),
            RegistryEntry::Leaf(_) => None,
        })
    }

    /// 服务注册信息快照
    pub(crate) fn service_spec(&self, name: &str) -> Option<ServiceSpec> {
        self.entries.get(name).and_then(|entry| match entry.value() {
            RegistryEntry::Leaf(spec) => Some(spec.clone()),
            RegistryEntry::Group(_) => None,
        })
    }

    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub(crate) fn count(&self, kind: EntryKind) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().kind() == kind)
            .count()
    }

    pub(crate) fn dependency_graph(&self) -> Vec<DependencyGraphNode> {
        let mut graph: Vec<DependencyGraphNode> = self
            .entries
            .iter()
            .map(|entry| DependencyGraphNode::from_entry(entry.key().clone(), entry.value()))
            .collect();
        graph.sort_by(|a, b| a.name.cmp(&b.name));
        graph
    }
}
