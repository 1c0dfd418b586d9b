//! 依赖注入容器抽象接口
//!
//! 提供依赖注入容器的核心抽象

use crate::binding::Concrete;
use crate::callable::Callable;
use crate::resolver::ResolveOptions;
use di_common::{ConfigError, ConfigResult, DependencyResult, Instance, Overrides};
use serde::Deserialize;
use std::sync::Arc;

/// 延迟解析句柄，调用时才执行 `make`
pub type DeferredFactory = Arc<dyn Fn() -> DependencyResult<Instance> + Send + Sync>;

/// 依赖注入容器 trait
///
/// 提供完整的依赖注入功能。绑定、别名和进程级实例由所有共享同一注册表的容器可见；
/// `share` 放入的实例只在当前容器（一次请求）内可见。
pub trait ContainerContract: Send + Sync {
    /// 注册绑定，已存在时覆盖
    fn bind(&self, abstract_name: &str, concrete: Concrete, shared: bool);

    /// 未绑定时才注册，返回是否注册成功
    fn bind_if(&self, abstract_name: &str, concrete: Concrete, shared: bool) -> bool;

    /// 注册共享绑定，首次解析后缓存在进程级存储中
    fn singleton(&self, abstract_name: &str, concrete: Concrete) {
        self.bind(abstract_name, concrete, true);
    }

    /// 为抽象名添加别名
    ///
    /// 自别名或形成环时返回配置错误
    fn alias(&self, abstract_name: &str, alias: &str) -> DependencyResult<()>;

    /// 只检查当前注册表和当前容器
    fn bound(&self, abstract_name: &str) -> bool;

    /// 注册进程级实例，多个请求级容器共享
    fn instance(&self, abstract_name: &str, value: Instance) -> Instance;

    /// 注册请求级实例，容器之间相互隔离
    fn share(&self, abstract_name: &str, value: Instance) -> Instance;

    /// 获取延迟解析句柄
    fn factory(&self, abstract_name: &str) -> DeferredFactory;

    /// 移除单个抽象名的绑定与已解析的实例
    fn forget(&self, abstract_name: &str) -> bool;

    /// 清空所有绑定、别名和已解析的实例
    fn flush(&self);

    /// 解析抽象名
    fn make(&self, abstract_name: &str, overrides: Overrides) -> DependencyResult<Instance>;

    /// 注入依赖并调用
    ///
    /// 覆盖表可以用参数名或参数类型名作为键
    fn call(&self, callable: Callable, overrides: Overrides) -> DependencyResult<Instance>;

    /// 同 [`ContainerContract::bound`]
    fn has(&self, id: &str) -> bool {
        self.bound(id)
    }

    /// 同不带覆盖表的 [`ContainerContract::make`]
    fn get(&self, id: &str) -> DependencyResult<Instance> {
        self.make(id, Overrides::new())
    }
}

/// 容器配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 最大解析深度
    pub max_resolution_depth: usize,
}

impl ContainerConfig {
    /// 从 TOML 文本加载
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 转换为解析选项
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            max_depth: self.max_resolution_depth,
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: ResolveOptions::default().max_depth,
        }
    }
}
