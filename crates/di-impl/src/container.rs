//! 请求级容器
//!
//! 每个逻辑请求使用自己的 [`Container`]，它们共享同一个 [`Registry`]，
//! 但各自持有独立的请求级实例缓存。

use crate::registry::Registry;
use crate::resolve::BuildSession;
use di_abstractions::{Callable, Concrete, ContainerConfig, ContainerContract, DeferredFactory};
use di_common::{downcast, DependencyResult, Instance, Overrides, TypeDescriptor};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 请求级实例缓存
#[derive(Debug)]
struct RequestScope {
    id: Uuid,
    instances: RwLock<HashMap<String, Instance>>,
}

impl RequestScope {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            instances: RwLock::new(HashMap::new()),
        }
    }
}

/// 具体的依赖注入容器实现
///
/// `clone` 得到的是同一请求的另一个句柄；新请求请使用 [`Container::new_scope`]。
#[derive(Debug, Clone)]
pub struct Container {
    registry: Arc<Registry>,
    scope: Arc<RequestScope>,
}

impl Container {
    /// 创建新的容器和新的注册表
    pub fn new() -> Self {
        Self::with_registry(Arc::new(Registry::new()))
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self::with_registry(Arc::new(Registry::with_config(config)))
    }

    /// 在已有注册表上创建容器
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        let container = Self {
            registry,
            scope: Arc::new(RequestScope::new()),
        };
        debug!(scope = %container.scope_id(), "创建容器");
        container
    }

    /// 同一注册表上的新请求级容器，请求级实例为空
    pub fn new_scope(&self) -> Self {
        Self::with_registry(Arc::clone(&self.registry))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn scope_id(&self) -> Uuid {
        self.scope.id
    }

    /// 注册类型描述符
    pub fn describe(&self, descriptor: TypeDescriptor) {
        self.registry.describe(descriptor);
    }

    /// 解析并还原为具体类型
    pub fn make_as<T: Any + Send + Sync>(&self, abstract_name: &str) -> DependencyResult<Arc<T>> {
        let value = self.make(abstract_name, Overrides::new())?;
        downcast(value, abstract_name)
    }

    /// 调用并还原返回值类型
    pub fn call_as<T: Any + Send + Sync>(
        &self,
        callable: impl Into<Callable>,
        overrides: Overrides,
    ) -> DependencyResult<Arc<T>> {
        let callable = callable.into();
        let name = callable.describe();
        let value = self.call(callable, overrides)?;
        downcast(value, &name)
    }

    pub(crate) fn scoped_instance(&self, abstract_name: &str) -> Option<Instance> {
        self.scope.instances.read().get(abstract_name).cloned()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerContract for Container {
    fn bind(&self, abstract_name: &str, concrete: Concrete, shared: bool) {
        self.registry.bind(abstract_name, concrete, shared);
    }

    fn bind_if(&self, abstract_name: &str, concrete: Concrete, shared: bool) -> bool {
        if self.bound(abstract_name) {
            return false;
        }
        self.bind(abstract_name, concrete, shared);
        true
    }

    fn alias(&self, abstract_name: &str, alias: &str) -> DependencyResult<()> {
        self.registry.alias(abstract_name, alias)
    }

    fn bound(&self, abstract_name: &str) -> bool {
        self.registry.bound(abstract_name)
            || self.scope.instances.read().contains_key(abstract_name)
    }

    fn instance(&self, abstract_name: &str, value: Instance) -> Instance {
        self.registry.instance(abstract_name, value)
    }

    /// 以请求名为键保存；名称是别名时在当前容器内遮蔽该别名
    fn share(&self, abstract_name: &str, value: Instance) -> Instance {
        debug!(scope = %self.scope_id(), "注册请求级实例: {}", abstract_name);
        self.scope
            .instances
            .write()
            .insert(abstract_name.to_string(), Arc::clone(&value));
        value
    }

    /// 句柄持有容器的克隆，不要把它存回同一个注册表
    fn factory(&self, abstract_name: &str) -> DeferredFactory {
        let container = self.clone();
        let abstract_name = abstract_name.to_string();
        Arc::new(move || container.make(&abstract_name, Overrides::new()))
    }

    fn forget(&self, abstract_name: &str) -> bool {
        let scoped = self.scope.instances.write().remove(abstract_name).is_some();
        self.registry.forget(abstract_name) || scoped
    }

    fn flush(&self) {
        self.registry.flush();
        self.scope.instances.write().clear();
        info!(scope = %self.scope_id(), "容器已清空");
    }

    fn make(&self, abstract_name: &str, overrides: Overrides) -> DependencyResult<Instance> {
        BuildSession::new(self).resolve(abstract_name, overrides)
    }

    fn call(&self, callable: Callable, overrides: Overrides) -> DependencyResult<Instance> {
        BuildSession::new(self).invoke(callable, overrides)
    }
}
