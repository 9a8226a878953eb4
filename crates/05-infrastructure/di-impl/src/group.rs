//! 服务组解析

use crate::container::ServiceContainer;
use di_abstractions::{ResolveContext, Resolved};
use infrastructure_common::{ContainerError, ContainerResult};
use tracing::{debug, info};

impl ServiceContainer {
    /// 按加入顺序逐个解析成员，结果不缓存
    ///
    /// 服务组回调只在第一次解析完成时执行，之后加入的成员不会再次触发。
    pub(crate) async fn resolve_group(
        &self,
        name: &str,
        ctx: &ResolveContext,
    ) -> ContainerResult<Resolved> {
        let ctx = ctx.enter(name)?;
        let members = self.group_members(name).unwrap_or_default();
        debug!("解析服务组: {} ({} 个成员)", name, members.len());

        let mut resolved = Vec::with_capacity(members.len());
        for member in members {
            let value = self.resolve_in(member.clone(), ctx.clone()).await?;
            resolved.push((member, value));
        }

        let group = Resolved::Group {
            name: name.to_string(),
            members: resolved,
        };

        let slot = self.slot(name);
        let mut fired = Ok(());
        let outcome = &mut fired;
        let snapshot = &group;
        slot.get_or_try_init(|| async move {
            info!("服务组首次解析完成: {}", name);
            *outcome = self.inner.callbacks.fire(name, self, snapshot);
            Ok::<(), ContainerError>(())
        })
        .await?;

        fired?;
        Ok(group)
    }
}
