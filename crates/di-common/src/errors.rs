//! 错误类型定义

use thiserror::Error;

/// 被调用方（构造函数、工厂、方法或闭包体）抛出的错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 容器配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置解析失败: {source}")]
    ParseError {
        #[from]
        source: toml::de::Error,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 依赖注入错误类型
///
/// 除 [`DependencyError::Callee`] 外，所有错误都表示静态的装配错误，不可重试。
#[derive(Error, Debug)]
pub enum DependencyError {
    /// 自别名或别名环
    #[error("容器配置错误: {message}")]
    Configuration { message: String },

    #[error("组件未注册: {type_name}")]
    ComponentNotRegistered { type_name: String },

    #[error("类型不可实例化: {type_name}")]
    NotInstantiable { type_name: String },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("解析深度超过上限 {max_depth}: {dependency_chain}")]
    ResolutionTooDeep {
        max_depth: usize,
        dependency_chain: String,
    },

    #[error("无法解析参数 ${parameter} (位于 {callable})")]
    UnresolvableParameter { parameter: String, callable: String },

    #[error("不可调用: {message}")]
    InvalidCallable { message: String },

    #[error("缺少第 {index} 个参数")]
    ArgumentMissing { index: usize },

    #[error("第 {index} 个参数类型不匹配, 期望 {expected}")]
    ArgumentTypeMismatch { index: usize, expected: String },

    #[error("实例类型不匹配: {type_name}, 期望 {expected}")]
    InstanceTypeMismatch { type_name: String, expected: String },

    /// 被调用方自身的失败，原样透传
    #[error(transparent)]
    Callee(BoxError),
}

impl DependencyError {
    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 创建不可调用错误
    pub fn invalid_callable(message: impl Into<String>) -> Self {
        Self::InvalidCallable {
            message: message.into(),
        }
    }

    /// 包装被调用方抛出的错误
    pub fn callee(error: impl Into<BoxError>) -> Self {
        Self::Callee(error.into())
    }

    /// 是否为配置错误（自别名、别名环）
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// 是否为循环依赖错误
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// 如果是被调用方的错误，尝试取回原始错误类型
    pub fn callee_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Callee(source) => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
