//! # DI Common
//!
//! 这个 crate 提供了 Lorn Container 的公共类型。
//!
//! ## 核心组件
//!
//! - [`Instance`] / [`Overrides`] / [`Arguments`] - 容器中流转的动态值
//! - [`TypeDescriptor`] - 显式类型描述（构造参数、方法、调用方法）
//! - [`DependencyError`] - 依赖解析错误
//!
//! ## 设计原则
//!
//! - 不依赖运行时反射，类型信息全部显式声明
//! - 被调用方的错误原样透传

pub mod descriptor;
pub mod errors;
pub mod value;

pub use descriptor::*;
pub use errors::*;
pub use value::*;
