//! 组件解析器抽象接口
//!
//! 提供依赖解析和组件实例化的能力

use crate::callable::Callable;
use di_common::{downcast, DependencyError, DependencyResult, Instance, Overrides};
use std::any::Any;
use std::sync::Arc;

/// 解析会话
///
/// 工厂函数拿到的就是当前会话，在其中继续 `make`/`call` 会共享同一个构建栈，
/// 经由工厂形成的循环依赖同样能被检测到。
pub trait Resolver {
    /// 解析抽象名
    fn make_with(&mut self, abstract_name: &str, overrides: Overrides) -> DependencyResult<Instance>;

    /// 注入依赖并调用
    fn call_with(&mut self, callable: Callable, overrides: Overrides) -> DependencyResult<Instance>;

    /// 当前解析上下文
    fn context(&self) -> &ResolveContext;
}

/// [`Resolver`] 的便捷方法
pub trait ResolverExt: Resolver {
    fn make(&mut self, abstract_name: &str) -> DependencyResult<Instance> {
        self.make_with(abstract_name, Overrides::new())
    }

    /// 解析并还原为具体类型
    fn make_as<T: Any + Send + Sync>(&mut self, abstract_name: &str) -> DependencyResult<Arc<T>> {
        let value = self.make(abstract_name)?;
        downcast(value, abstract_name)
    }

    fn call(&mut self, callable: impl Into<Callable>) -> DependencyResult<Instance> {
        self.call_with(callable.into(), Overrides::new())
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}

/// 解析上下文
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链，用于检测循环依赖
    pub resolution_chain: Vec<String>,
    /// 解析选项
    pub options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::with_options(ResolveOptions::default())
    }

    pub fn with_options(options: ResolveOptions) -> Self {
        Self {
            resolution_chain: Vec::new(),
            options,
        }
    }

    /// 添加类型到解析链
    pub fn push_type(&mut self, name: &str) -> DependencyResult<()> {
        if self.resolution_chain.iter().any(|n| n == name) {
            return Err(DependencyError::CircularDependency {
                dependency_chain: self.chain_with(name),
            });
        }
        if self.resolution_chain.len() >= self.options.max_depth {
            return Err(DependencyError::ResolutionTooDeep {
                max_depth: self.options.max_depth,
                dependency_chain: self.chain_with(name),
            });
        }
        self.resolution_chain.push(name.to_string());
        Ok(())
    }

    /// 从解析链中移除类型
    pub fn pop_type(&mut self) {
        self.resolution_chain.pop();
    }

    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    fn chain_with(&self, name: &str) -> String {
        self.resolution_chain
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析选项
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// 最大递归深度
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}
