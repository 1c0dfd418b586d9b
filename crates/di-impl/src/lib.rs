//! # 依赖注入具体实现
//!
//! 提供注册表、请求级容器、类型解析和调用解析的实现
//!
//! ```
//! use di_impl::prelude::*;
//!
//! #[derive(Debug)]
//! struct Clock;
//!
//! #[derive(Debug)]
//! struct Greeter {
//!     clock: std::sync::Arc<Clock>,
//! }
//!
//! let container = Container::new();
//! container.describe(TypeDescriptor::builder("Clock").constructor(vec![], |_| Ok(Clock)).build());
//! container.describe(
//!     TypeDescriptor::builder("Greeter")
//!         .constructor(vec![ParameterDescriptor::typed("clock", "Clock")], |args| {
//!             Ok(Greeter { clock: args.get::<Clock>(0)? })
//!         })
//!         .build(),
//! );
//!
//! let greeter = container.make_as::<Greeter>("Greeter").unwrap();
//! # let _ = &greeter.clock;
//! ```

mod bound_method;
pub mod container;
pub mod registry;
pub mod resolve;

pub use container::Container;
pub use registry::Registry;
pub use resolve::BuildSession;

/// 常用类型
pub mod prelude {
    pub use crate::{Container, Registry};
    pub use di_abstractions::{
        Callable, Closure, Concrete, ContainerConfig, ContainerContract, Resolver, ResolverExt,
        Target,
    };
    pub use di_common::{
        instance, Arguments, DependencyError, DependencyResult, Instance, Overrides,
        ParameterDescriptor, TypeDescriptor,
    };
}
