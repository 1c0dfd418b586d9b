//! 类型解析
//!
//! 一次顶层 `make`/`call` 对应一个 [`BuildSession`]，构建栈只存在于会话内部。

use crate::container::Container;
use di_abstractions::{Callable, Concrete, ResolveContext, Resolver};
use di_common::{DependencyError, DependencyResult, Instance, Overrides};
use tracing::{debug, trace};

/// 解析会话
pub struct BuildSession<'c> {
    container: &'c Container,
    context: ResolveContext,
}

impl<'c> BuildSession<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        let options = container.registry().config().resolve_options();
        Self {
            container,
            context: ResolveContext::with_options(options),
        }
    }

    pub(crate) fn container(&self) -> &'c Container {
        self.container
    }

    /// 解析抽象名
    ///
    /// 顺序：别名 -> 进程级实例 -> 请求级实例 -> 绑定或自动装配。
    /// 以别名 `share` 的请求级实例遮蔽该别名。只有构造成功后才会写入缓存。
    pub(crate) fn resolve(
        &mut self,
        abstract_name: &str,
        overrides: Overrides,
    ) -> DependencyResult<Instance> {
        let container = self.container;
        let registry = container.registry();
        let name = registry.canonical_name(abstract_name)?;

        if name != abstract_name {
            if let Some(value) = container.scoped_instance(abstract_name) {
                trace!(scope = %container.scope_id(), "命中请求级实例: {}", abstract_name);
                return Ok(value);
            }
        }

        if let Some(value) = registry.resolved_instance(&name) {
            trace!(scope = %container.scope_id(), "命中进程级实例: {}", name);
            return Ok(value);
        }
        if let Some(value) = container.scoped_instance(&name) {
            trace!(scope = %container.scope_id(), "命中请求级实例: {}", name);
            return Ok(value);
        }

        self.context.push_type(&name)?;
        let built = self.build(&name, overrides);
        self.context.pop_type();
        let (value, shared) = built?;

        if shared {
            debug!(scope = %container.scope_id(), "缓存共享实例: {}", name);
            return Ok(registry.store_shared(&name, value));
        }
        Ok(value)
    }

    fn build(&mut self, name: &str, overrides: Overrides) -> DependencyResult<(Instance, bool)> {
        let Some(binding) = self.container.registry().binding(name) else {
            return self.autowire(name, overrides).map(|value| (value, false));
        };

        let value = match &binding.concrete {
            Concrete::Factory(factory) => {
                trace!("通过工厂构造: {}", name);
                let resolver: &mut dyn Resolver = self;
                factory(resolver, overrides)?
            }
            Concrete::Class(class) if class != name => {
                trace!("{} 解析为 {}", name, class);
                self.resolve(class, overrides)?
            }
            Concrete::Class(_) | Concrete::Abstract => self.autowire(name, overrides)?,
        };
        Ok((value, binding.shared))
    }

    /// 按构造函数描述自动装配
    fn autowire(&mut self, name: &str, overrides: Overrides) -> DependencyResult<Instance> {
        let descriptor = self
            .container
            .registry()
            .descriptor(name)
            .ok_or_else(|| DependencyError::ComponentNotRegistered {
                type_name: name.to_string(),
            })?;
        let constructor =
            descriptor
                .constructor()
                .ok_or_else(|| DependencyError::NotInstantiable {
                    type_name: name.to_string(),
                })?;

        let args = self.dependencies(constructor.parameters(), overrides, name)?;
        trace!("自动装配 {} ({} 个参数)", name, args.len());
        constructor.invoke(&args)
    }
}

impl Resolver for BuildSession<'_> {
    fn make_with(&mut self, abstract_name: &str, overrides: Overrides) -> DependencyResult<Instance> {
        self.resolve(abstract_name, overrides)
    }

    fn call_with(&mut self, callable: Callable, overrides: Overrides) -> DependencyResult<Instance> {
        self.invoke(callable, overrides)
    }

    fn context(&self) -> &ResolveContext {
        &self.context
    }
}
