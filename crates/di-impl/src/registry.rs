//! 进程级注册表
//!
//! 保存绑定、别名、进程级实例和类型描述符，由同一进程内的所有容器共享。

use dashmap::DashMap;
use di_abstractions::{Binding, Concrete, ContainerConfig};
use di_common::{DependencyError, DependencyResult, Instance, TypeDescriptor};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// 绑定注册表
pub struct Registry {
    /// 抽象名 -> 绑定
    bindings: RwLock<HashMap<String, Binding>>,
    /// 别名 -> 抽象名
    aliases: RwLock<HashMap<String, String>>,
    /// 进程级实例
    instances: RwLock<HashMap<String, Instance>>,
    /// 类型描述符，`flush` 不会清除
    descriptors: DashMap<String, Arc<TypeDescriptor>>,
    config: ContainerConfig,
}

impl Registry {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建注册表
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            aliases: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
            descriptors: DashMap::new(),
            config,
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 注册类型描述符，同名覆盖
    pub fn describe(&self, descriptor: TypeDescriptor) {
        debug!("注册类型描述: {}", descriptor.name());
        self.descriptors
            .insert(descriptor.name().to_string(), Arc::new(descriptor));
    }

    /// 按类型名查找类型描述符
    pub fn descriptor(&self, type_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.descriptors
            .get(type_name)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// 注册绑定，已存在时覆盖
    ///
    /// 同名别名会被移除；已解析的实例不受影响。
    pub fn bind(&self, abstract_name: &str, concrete: Concrete, shared: bool) {
        debug!("注册绑定: {} -> {:?} (shared={})", abstract_name, concrete, shared);
        self.aliases.write().remove(abstract_name);
        self.bindings.write().insert(
            abstract_name.to_string(),
            Binding::new(abstract_name, concrete, shared),
        );
    }

    /// 按抽象名查找绑定（副本）
    pub fn binding(&self, abstract_name: &str) -> Option<Binding> {
        self.bindings.read().get(abstract_name).cloned()
    }

    /// 添加别名 `alias -> abstract_name`
    pub fn alias(&self, abstract_name: &str, alias: &str) -> DependencyResult<()> {
        if alias == abstract_name {
            return Err(DependencyError::configuration(format!(
                "[{abstract_name}] 不能作为自身的别名"
            )));
        }

        let mut aliases = self.aliases.write();
        // 从 abstract_name 出发能回到 alias 即成环
        let mut chain = vec![alias.to_string(), abstract_name.to_string()];
        let mut current = abstract_name;
        while let Some(next) = aliases.get(current) {
            chain.push(next.clone());
            if next == alias || chain.len() > aliases.len() + 2 {
                return Err(DependencyError::configuration(format!(
                    "别名形成环: {}",
                    chain.join(" -> ")
                )));
            }
            current = next;
        }

        debug!("注册别名: {} -> {}", alias, abstract_name);
        aliases.insert(alias.to_string(), abstract_name.to_string());
        Ok(())
    }

    /// 是否为已注册的别名
    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.read().contains_key(name)
    }

    /// 沿别名链解析到非别名的规范名
    pub fn canonical_name(&self, name: &str) -> DependencyResult<String> {
        let aliases = self.aliases.read();
        let mut visited = HashSet::new();
        let mut current = name;
        while let Some(next) = aliases.get(current) {
            if !visited.insert(current) {
                return Err(DependencyError::configuration(format!(
                    "解析 [{name}] 时别名形成环"
                )));
            }
            current = next;
        }
        Ok(current.to_string())
    }

    /// 注册进程级实例，同名别名会被移除
    pub fn instance(&self, abstract_name: &str, value: Instance) -> Instance {
        debug!("注册进程级实例: {}", abstract_name);
        self.aliases.write().remove(abstract_name);
        self.instances
            .write()
            .insert(abstract_name.to_string(), Arc::clone(&value));
        value
    }

    /// 已缓存的进程级实例
    pub fn resolved_instance(&self, abstract_name: &str) -> Option<Instance> {
        self.instances.read().get(abstract_name).cloned()
    }

    /// 缓存共享绑定的构造结果；并发构造时以先写入者为准
    pub(crate) fn store_shared(&self, abstract_name: &str, value: Instance) -> Instance {
        let mut instances = self.instances.write();
        Arc::clone(
            instances
                .entry(abstract_name.to_string())
                .or_insert(value),
        )
    }

    /// 是否存在绑定、别名或进程级实例
    pub fn bound(&self, abstract_name: &str) -> bool {
        self.bindings.read().contains_key(abstract_name)
            || self.instances.read().contains_key(abstract_name)
            || self.is_alias(abstract_name)
    }

    /// 移除单个抽象名的绑定和进程级实例，返回是否移除了任何内容
    ///
    /// 指向它的别名保留。
    pub fn forget(&self, abstract_name: &str) -> bool {
        let binding = self.bindings.write().remove(abstract_name).is_some();
        let instance = self.instances.write().remove(abstract_name).is_some();
        if binding || instance {
            debug!("移除绑定: {}", abstract_name);
        }
        binding || instance
    }

    /// 清空绑定、别名和进程级实例
    pub fn flush(&self) {
        let bindings = {
            let mut bindings = self.bindings.write();
            let count = bindings.len();
            bindings.clear();
            count
        };
        self.aliases.write().clear();
        self.instances.write().clear();
        info!("注册表已清空，移除了 {} 个绑定", bindings);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("bindings", &self.bindings.read().len())
            .field("aliases", &self.aliases.read().len())
            .field("instances", &self.instances.read().len())
            .field("descriptors", &self.descriptors.len())
            .field("config", &self.config)
            .finish()
    }
}
