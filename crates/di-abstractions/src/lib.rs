//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义绑定模型、调用模型和解析接口。
//!
//! ## 核心接口
//!
//! - [`ContainerContract`] - 容器接口
//! - [`Concrete`] / [`Binding`] - 构造策略与绑定记录
//! - [`Callable`] - `call` 接受的调用说明
//! - [`Resolver`] - 工厂函数可见的解析会话

pub mod binding;
pub mod callable;
pub mod container;
pub mod resolver;

pub use binding::*;
pub use callable::*;
pub use container::*;
pub use resolver::*;
