//! 调用解析
//!
//! 用依赖注入的方式调用闭包、`"Type::method"`、(目标, 方法) 或带调用方法的类型。
//! 覆盖表中除了参数名，也可以用参数类型名注入临时依赖，让被调用方挑选。

use crate::resolve::BuildSession;
use di_abstractions::{Callable, Closure, Target};
use di_common::{
    required_arity, Arguments, DependencyError, DependencyResult, Instance, MethodBody,
    MethodDescriptor, Overrides, ParameterDescriptor, TypeDescriptor,
};
use std::sync::Arc;
use tracing::trace;

/// 规整后的可调用对象
enum BoundCallable {
    Function(Closure),
    Static {
        owner: String,
        method: MethodDescriptor,
    },
    Method {
        owner: String,
        target: Instance,
        method: MethodDescriptor,
    },
}

impl BoundCallable {
    fn parameters(&self) -> &[ParameterDescriptor] {
        match self {
            Self::Function(closure) => closure.parameters(),
            Self::Static { method, .. } | Self::Method { method, .. } => method.parameters(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Function(closure) => closure.name().to_string(),
            Self::Static { owner, method } | Self::Method { owner, method, .. } => {
                format!("{}::{}", owner, method.name())
            }
        }
    }

    fn invoke(&self, args: &Arguments) -> DependencyResult<Instance> {
        match self {
            Self::Function(closure) => closure.invoke(args),
            Self::Static { method, .. } => match method.body() {
                MethodBody::Static(body) => body(args),
                MethodBody::Instance(_) => Err(DependencyError::invalid_callable(format!(
                    "{} 需要目标实例",
                    self.describe()
                ))),
            },
            Self::Method { target, method, .. } => match method.body() {
                MethodBody::Instance(body) => body(target, args),
                // 通过实例调用静态方法
                MethodBody::Static(body) => body(args),
            },
        }
    }
}

impl BuildSession<'_> {
    /// 注入依赖并调用，被调用方的返回值和错误原样返回
    pub(crate) fn invoke(
        &mut self,
        callable: Callable,
        overrides: Overrides,
    ) -> DependencyResult<Instance> {
        let bound = self.normalize(callable)?;
        let name = bound.describe();
        let args = self.dependencies(bound.parameters(), overrides, &name)?;
        trace!("调用 {} ({} 个参数)", name, args.len());
        bound.invoke(&args)
    }

    fn normalize(&mut self, callable: Callable) -> DependencyResult<BoundCallable> {
        match callable {
            Callable::Closure(closure) => Ok(BoundCallable::Function(closure)),
            Callable::Qualified(text) => {
                let (type_name, method) = text
                    .split_once("::")
                    .filter(|(t, m)| !t.is_empty() && !m.is_empty())
                    .ok_or_else(|| {
                        DependencyError::invalid_callable(format!("无法解析调用说明: {text}"))
                    })?;
                self.bind_method(Target::from(type_name), method)
            }
            Callable::Method(target, method) => self.bind_method(target, &method),
            Callable::Invokable(target) => {
                let descriptor = self.callable_descriptor(target.type_name())?;
                let method = descriptor
                    .invoke_method()
                    .ok_or_else(|| {
                        DependencyError::invalid_callable(format!(
                            "{} 没有调用方法",
                            target.type_name()
                        ))
                    })?
                    .clone();
                self.bind_target(target, descriptor.name(), method)
            }
        }
    }

    fn bind_method(&mut self, target: Target, method_name: &str) -> DependencyResult<BoundCallable> {
        let descriptor = self.callable_descriptor(target.type_name())?;
        let method = descriptor.method(method_name).cloned().ok_or_else(|| {
            DependencyError::invalid_callable(format!(
                "方法不存在: {}::{}",
                target.type_name(),
                method_name
            ))
        })?;
        self.bind_target(target, descriptor.name(), method)
    }

    /// 类型名配实例方法时先 `make` 出目标实例；静态方法保留类型名
    fn bind_target(
        &mut self,
        target: Target,
        owner: &str,
        method: MethodDescriptor,
    ) -> DependencyResult<BoundCallable> {
        let owner = owner.to_string();
        if method.is_static() {
            return Ok(BoundCallable::Static { owner, method });
        }

        let target = match target {
            Target::Object { instance, .. } => instance,
            Target::Type(type_name) => self.resolve(&type_name, Overrides::new())?,
        };
        Ok(BoundCallable::Method {
            owner,
            target,
            method,
        })
    }

    /// 先按原名查找类型描述，再按别名解析后的规范名查找
    fn callable_descriptor(&self, type_name: &str) -> DependencyResult<Arc<TypeDescriptor>> {
        let registry = self.container().registry();
        registry
            .descriptor(type_name)
            .or_else(|| {
                registry
                    .canonical_name(type_name)
                    .ok()
                    .and_then(|name| registry.descriptor(&name))
            })
            .ok_or_else(|| {
                DependencyError::invalid_callable(format!("{type_name} 不可调用"))
            })
    }

    /// 按顺序为每个形参取值：
    /// 参数名覆盖 -> 类型名覆盖 -> `make` 声明类型 -> 默认值 -> 省略。
    /// 未被消费的覆盖值按插入顺序追加在末尾。
    pub(crate) fn dependencies(
        &mut self,
        parameters: &[ParameterDescriptor],
        mut overrides: Overrides,
        owner: &str,
    ) -> DependencyResult<Arguments> {
        let mut resolved = Vec::with_capacity(parameters.len() + overrides.len());
        let mut omitted: Option<&str> = None;

        for parameter in parameters {
            if let Some(value) = overrides.take(parameter.name()) {
                resolved.push(value);
                continue;
            }
            if let Some(type_name) = parameter.declared_type() {
                let value = match overrides.take(type_name) {
                    Some(value) => value,
                    None => self.resolve(type_name, Overrides::new())?,
                };
                resolved.push(value);
                continue;
            }
            if let Some(default) = parameter.default_value() {
                resolved.push(Arc::clone(default));
                continue;
            }
            trace!("{} 的参数 ${} 没有可用的值", owner, parameter.name());
            omitted.get_or_insert(parameter.name());
        }

        // 被省略的必填参数只能由尾部参数补位，否则后续的值会错位
        if let Some(parameter) = omitted.filter(|_| overrides.is_empty()) {
            return Err(unresolvable(parameter, owner));
        }
        resolved.extend(overrides.into_values());

        if resolved.len() < required_arity(parameters) {
            let parameter = omitted
                .or_else(|| parameters.get(resolved.len()).map(ParameterDescriptor::name))
                .unwrap_or_default();
            return Err(unresolvable(parameter, owner));
        }
        Ok(Arguments::new(resolved))
    }
}

fn unresolvable(parameter: &str, owner: &str) -> DependencyError {
    DependencyError::UnresolvableParameter {
        parameter: parameter.to_string(),
        callable: owner.to_string(),
    }
}
