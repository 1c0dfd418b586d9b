//! 绑定模型
//!
//! 抽象名到构造策略的映射

use crate::resolver::Resolver;
use di_common::{DependencyResult, Instance, Overrides};
use std::fmt;
use std::sync::Arc;

/// 工厂函数类型
///
/// 工厂接收当前解析会话和调用方传入的覆盖表，返回值原样使用。
pub type FactoryFn =
    Arc<dyn Fn(&mut dyn Resolver, Overrides) -> DependencyResult<Instance> + Send + Sync>;

/// 构造策略
#[derive(Clone, Default)]
pub enum Concrete {
    /// 抽象名本身即可实例化，自动装配其构造函数
    #[default]
    Abstract,
    /// 解析为另一个类型名
    Class(String),
    /// 由工厂函数构造
    Factory(FactoryFn),
}

impl Concrete {
    /// 绑定到另一个类型名
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    /// 绑定到工厂函数
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&mut dyn Resolver, Overrides) -> DependencyResult<Instance> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }
}

impl From<&str> for Concrete {
    fn from(name: &str) -> Self {
        Self::class(name)
    }
}

impl From<String> for Concrete {
    fn from(name: String) -> Self {
        Self::Class(name)
    }
}

impl fmt::Debug for Concrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abstract => f.write_str("Abstract"),
            Self::Class(name) => f.debug_tuple("Class").field(name).finish(),
            Self::Factory(_) => f.write_str("Factory(<function>)"),
        }
    }
}

/// 绑定记录
#[derive(Debug, Clone)]
pub struct Binding {
    /// 抽象名
    pub abstract_name: String,
    /// 构造策略
    pub concrete: Concrete,
    /// 首次构造后是否在进程级存储中缓存
    pub shared: bool,
}

impl Binding {
    pub fn new(abstract_name: impl Into<String>, concrete: Concrete, shared: bool) -> Self {
        Self {
            abstract_name: abstract_name.into(),
            concrete,
            shared,
        }
    }
}
