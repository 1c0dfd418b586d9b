//! 类型描述层
//!
//! Rust 没有运行时反射，容器通过显式注册的描述符得知类型的构造参数、
//! 方法签名以及默认值。描述符只记录参数名、单一的声明类型名和默认值。

use crate::errors::{DependencyError, DependencyResult};
use crate::value::{Arguments, Instance};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 函数体：接收位置参数
pub type InvokeFn = Arc<dyn Fn(&Arguments) -> DependencyResult<Instance> + Send + Sync>;

/// 实例方法体：接收目标实例和位置参数
pub type MethodFn = Arc<dyn Fn(&Instance, &Arguments) -> DependencyResult<Instance> + Send + Sync>;

/// 形参描述
#[derive(Clone)]
pub struct ParameterDescriptor {
    name: String,
    declared_type: Option<String>,
    default: Option<Instance>,
}

impl ParameterDescriptor {
    /// 无类型声明的参数
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            default: None,
        }
    }

    /// 声明了具体类型的参数
    pub fn typed(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: Some(declared_type.into()),
            default: None,
        }
    }

    /// 设置默认值
    pub fn with_default<T: Any + Send + Sync>(self, value: T) -> Self {
        self.with_default_instance(Arc::new(value))
    }

    pub fn with_default_instance(mut self, value: Instance) -> Self {
        self.default = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Instance> {
        self.default.as_ref()
    }
}

impl fmt::Debug for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("has_default", &self.has_default())
            .finish()
    }
}

/// 必填参数个数：最后一个没有默认值的参数的位置 + 1
pub fn required_arity(parameters: &[ParameterDescriptor]) -> usize {
    parameters
        .iter()
        .rposition(|p| !p.has_default())
        .map_or(0, |i| i + 1)
}

/// 构造函数描述
#[derive(Clone)]
pub struct ConstructorDescriptor {
    parameters: Vec<ParameterDescriptor>,
    body: InvokeFn,
}

impl ConstructorDescriptor {
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn invoke(&self, args: &Arguments) -> DependencyResult<Instance> {
        (self.body)(args)
    }
}

/// 方法体
#[derive(Clone)]
pub enum MethodBody {
    /// 类型级（静态）方法
    Static(InvokeFn),
    /// 实例方法
    Instance(MethodFn),
}

/// 方法描述
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    parameters: Vec<ParameterDescriptor>,
    body: MethodBody,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }

    pub fn body(&self) -> &MethodBody {
        &self.body
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("static", &self.is_static())
            .finish()
    }
}

/// 类型描述符
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    constructor: Option<ConstructorDescriptor>,
    methods: HashMap<String, MethodDescriptor>,
    invoke_method: Option<String>,
}

impl TypeDescriptor {
    /// 开始描述一个类型
    pub fn builder(name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            descriptor: Self {
                name: name.into(),
                constructor: None,
                methods: HashMap::new(),
                invoke_method: None,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 没有构造函数的类型（接口、契约）不可实例化
    pub fn constructor(&self) -> Option<&ConstructorDescriptor> {
        self.constructor.as_ref()
    }

    pub fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// 指定的调用方法（类似 `__invoke`）
    pub fn invoke_method(&self) -> Option<&MethodDescriptor> {
        self.invoke_method
            .as_deref()
            .and_then(|name| self.methods.get(name))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field(
                "constructor",
                &self.constructor.as_ref().map(ConstructorDescriptor::parameters),
            )
            .field("methods", &methods)
            .field("invoke_method", &self.invoke_method)
            .finish()
    }
}

/// 类型描述符构建器
pub struct TypeDescriptorBuilder {
    descriptor: TypeDescriptor,
}

impl TypeDescriptorBuilder {
    /// 声明构造函数
    pub fn constructor<T, F>(mut self, parameters: Vec<ParameterDescriptor>, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> DependencyResult<T> + Send + Sync + 'static,
    {
        self.descriptor.constructor = Some(ConstructorDescriptor {
            parameters,
            body: Arc::new(move |args: &Arguments| {
                body(args).map(|value| Arc::new(value) as Instance)
            }),
        });
        self
    }

    /// 声明无参构造函数
    pub fn default_constructor<T>(self) -> Self
    where
        T: Any + Send + Sync + Default,
    {
        self.constructor(Vec::new(), |_| Ok(T::default()))
    }

    /// 声明类型级（静态）方法
    pub fn method<R, F>(mut self, name: impl Into<String>, parameters: Vec<ParameterDescriptor>, body: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&Arguments) -> DependencyResult<R> + Send + Sync + 'static,
    {
        let name = name.into();
        self.descriptor.methods.insert(
            name.clone(),
            MethodDescriptor {
                name,
                parameters,
                body: MethodBody::Static(Arc::new(move |args: &Arguments| {
                    body(args).map(|value| Arc::new(value) as Instance)
                })),
            },
        );
        self
    }

    /// 声明实例方法，目标实例会被还原为 `&T`
    pub fn instance_method<T, R, F>(
        mut self,
        name: impl Into<String>,
        parameters: Vec<ParameterDescriptor>,
        body: F,
    ) -> Self
    where
        T: Any + Send + Sync,
        R: Any + Send + Sync,
        F: Fn(&T, &Arguments) -> DependencyResult<R> + Send + Sync + 'static,
    {
        let name = name.into();
        let owner = self.descriptor.name.clone();
        self.descriptor.methods.insert(
            name.clone(),
            MethodDescriptor {
                name,
                parameters,
                body: MethodBody::Instance(Arc::new(move |target: &Instance, args: &Arguments| {
                    let this = (**target).downcast_ref::<T>().ok_or_else(|| {
                        DependencyError::InstanceTypeMismatch {
                            type_name: owner.clone(),
                            expected: type_name::<T>().to_string(),
                        }
                    })?;
                    body(this, args).map(|value| Arc::new(value) as Instance)
                })),
            },
        );
        self
    }

    /// 指定调用方法
    pub fn invoke(mut self, method: impl Into<String>) -> Self {
        self.descriptor.invoke_method = Some(method.into());
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}
