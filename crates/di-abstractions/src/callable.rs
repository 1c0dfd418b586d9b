//! 可调用对象模型
//!
//! `call` 接受的几种形式在解析参数前会被规整为 (目标, 操作)。

use di_common::{Arguments, DependencyResult, Instance, InvokeFn, ParameterDescriptor};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 可直接调用的闭包，带有显式的形参描述
#[derive(Clone)]
pub struct Closure {
    name: String,
    parameters: Vec<ParameterDescriptor>,
    body: InvokeFn,
}

impl Closure {
    pub fn new<R, F>(name: impl Into<String>, parameters: Vec<ParameterDescriptor>, body: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&Arguments) -> DependencyResult<R> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters,
            body: Arc::new(move |args: &Arguments| {
                body(args).map(|value| Arc::new(value) as Instance)
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn invoke(&self, args: &Arguments) -> DependencyResult<Instance> {
        (self.body)(args)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// 方法调用的目标
#[derive(Clone)]
pub enum Target {
    /// 类型名，尚未实例化
    Type(String),
    /// 已有实例及其类型名
    Object { type_name: String, instance: Instance },
}

impl Target {
    pub fn object(type_name: impl Into<String>, instance: Instance) -> Self {
        Self::Object {
            type_name: type_name.into(),
            instance,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Type(name) | Self::Object { type_name: name, .. } => name,
        }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Self::Type(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Self::Type(name)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => f.debug_tuple("Type").field(name).finish(),
            Self::Object { type_name, .. } => f.debug_tuple("Object").field(type_name).finish(),
        }
    }
}

/// `call` 的调用说明
#[derive(Debug, Clone)]
pub enum Callable {
    /// 可直接调用的闭包
    Closure(Closure),
    /// `"Type::method"` 形式的字符串
    Qualified(String),
    /// (目标, 方法名)
    Method(Target, String),
    /// 带有调用方法的类型名或实例
    Invokable(Target),
}

impl Callable {
    pub fn closure<R, F>(name: impl Into<String>, parameters: Vec<ParameterDescriptor>, body: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&Arguments) -> DependencyResult<R> + Send + Sync + 'static,
    {
        Self::Closure(Closure::new(name, parameters, body))
    }

    pub fn method(target: impl Into<Target>, method: impl Into<String>) -> Self {
        Self::Method(target.into(), method.into())
    }

    /// 调用实例的调用方法
    pub fn object(type_name: impl Into<String>, instance: Instance) -> Self {
        Self::Invokable(Target::object(type_name, instance))
    }

    /// 用于日志和诊断的描述
    pub fn describe(&self) -> String {
        match self {
            Self::Closure(closure) => closure.name().to_string(),
            Self::Qualified(text) => text.clone(),
            Self::Method(target, method) => format!("{}::{}", target.type_name(), method),
            Self::Invokable(target) => target.type_name().to_string(),
        }
    }
}

/// 含 `::` 的字符串视为 `"Type::method"`，否则视为可调用类型名
impl From<&str> for Callable {
    fn from(text: &str) -> Self {
        if text.contains("::") {
            Self::Qualified(text.to_string())
        } else {
            Self::Invokable(Target::from(text))
        }
    }
}

impl From<String> for Callable {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<Closure> for Callable {
    fn from(closure: Closure) -> Self {
        Self::Closure(closure)
    }
}

impl<T: Into<Target>, M: Into<String>> From<(T, M)> for Callable {
    fn from((target, method): (T, M)) -> Self {
        Self::method(target, method)
    }
}
