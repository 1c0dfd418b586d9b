//! 依赖注入实现的集成测试：绑定、别名、作用域与类型解析


use common::{describe_mail_stack, init_test_logger, BuildCounter, Logger, Mailer};
use di_impl::prelude::*;
use std::sync::Arc;

/// 进程级实例忽略覆盖表，始终返回同一个值
#[test]
fn test_instance_ignores_overrides() {
    init_test_logger();
    let container = Container::new();
    let config = container.instance("Config", instance(String::from("prod")));

    let first = container.make("Config", Overrides::new()).unwrap();
    let second = container
        .make("Config", Overrides::new().with("value", String::from("dev")))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &config));
    assert!(Arc::ptr_eq(&second, &config));
}

/// 进程级实例对同一注册表上的其他容器可见
#[test]
fn test_instance_is_visible_across_scopes() {
    let container = Container::new();
    let config = container.instance("Config", instance(42_u32));

    let other = container.new_scope();
    assert_ne!(container.scope_id(), other.scope_id());
    assert!(Arc::ptr_eq(&other.get("Config").unwrap(), &config));
}

/// 单例首次解析时构造，之后即使覆盖表不同也返回同一个值
#[test]
fn test_singleton_is_built_once() {
    init_test_logger();
    let container = Container::new();
    let counter = describe_mail_stack(&container);
    container.singleton("Logger", Concrete::Abstract);

    let first = container.make_as::<Logger>("Logger").unwrap();
    let second = container
        .make("Logger", Overrides::new().with("serial", 99_usize))
        .unwrap();

    assert!(Arc::ptr_eq(&(first.clone() as Instance), &second));
    assert_eq!(first.serial, 1);
    assert_eq!(counter.count(), 1);
}

/// 非共享绑定每次都重新构造
#[test]
fn test_transient_binding_builds_every_time() {
    let container = Container::new();
    let counter = describe_mail_stack(&container);
    container.bind("Logger", Concrete::Abstract, false);

    let first = container.make_as::<Logger>("Logger").unwrap();
    let second = container.make_as::<Logger>("Logger").unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(counter.count(), 2);
}

/// 请求级实例只在当前容器可见
#[test]
fn test_shared_instance_is_scoped() {
    init_test_logger();
    let request = Container::new();
    let value = request.share("Request", instance(String::from("GET /")));

    assert!(request.bound("Request"));
    assert!(Arc::ptr_eq(&request.get("Request").unwrap(), &value));

    // 同一请求的句柄共享缓存
    let same_request = request.clone();
    assert!(Arc::ptr_eq(&same_request.get("Request").unwrap(), &value));

    let next_request = request.new_scope();
    assert!(!next_request.bound("Request"));
    assert!(matches!(
        next_request.get("Request"),
        Err(DependencyError::ComponentNotRegistered { type_name }) if type_name == "Request"
    ));
}

/// 两个容器为同一抽象名共享不同的值
#[test]
fn test_scopes_do_not_see_each_other() {
    let first = Container::new();
    let second = first.new_scope();

    let a = first.share("User", instance("alice"));
    let b = second.share("User", instance("bob"));

    assert!(Arc::ptr_eq(&first.get("User").unwrap(), &a));
    assert!(Arc::ptr_eq(&second.get("User").unwrap(), &b));
}

/// 以别名共享的请求级实例在当前容器内遮蔽别名
#[test]
fn test_share_under_alias_name() {
    let container = Container::new();
    let counter = describe_mail_stack(&container);
    container.alias("Logger", "Log").unwrap();

    let scoped = container.share("Log", instance(String::from("scoped")));

    assert!(container.bound("Log"));
    assert!(Arc::ptr_eq(&container.get("Log").unwrap(), &scoped));
    assert_eq!(counter.count(), 0);

    // 别名目标本身不受影响
    let logger = container.make_as::<Logger>("Logger").unwrap();
    assert_eq!(logger.serial, 1);

    // 其他请求仍沿别名解析
    let other = container.new_scope();
    assert!(other.make_as::<Logger>("Log").is_ok());
}

/// forget 只移除单个抽象名
#[test]
fn test_forget_single_abstract() {
    let container = Container::new();
    let counter = describe_mail_stack(&container);
    container.singleton("Logger", Concrete::Abstract);
    container.share("Request", instance(1_u8));
    container.instance("Config", instance(2_u8));
    let before = container.make_as::<Logger>("Logger").unwrap();

    assert!(container.forget("Logger"));
    assert!(container.forget("Request"));
    assert!(!container.forget("Missing"));

    assert!(!container.bound("Logger"));
    assert!(!container.bound("Request"));
    assert!(container.bound("Config"));

    // 未绑定时按描述重新自动装配
    let after = container.make_as::<Logger>("Logger").unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(counter.count(), 2);
}

/// 别名解析是传递的
#[test]
fn test_alias_resolution_is_transitive() {
    let container = Container::new();
    let counter = describe_mail_stack(&container);
    container.singleton("Logger", Concrete::Abstract);
    container.alias("Logger", "Log").unwrap();
    container.alias("Log", "Psr.Log").unwrap();

    let via_alias = container.make("Psr.Log", Overrides::new()).unwrap();
    let direct = container.make("Logger", Overrides::new()).unwrap();

    assert!(Arc::ptr_eq(&via_alias, &direct));
    assert_eq!(counter.count(), 1);
    assert!(container.bound("Log"));
    assert!(container.has("Psr.Log"));
}

/// 自别名与别名环在解析之前就被拒绝
#[test]
fn test_alias_cycles_are_configuration_errors() {
    let container = Container::new();

    assert!(container.alias("A", "A").unwrap_err().is_configuration());

    container.alias("A", "B").unwrap();
    let err = container.alias("B", "A").unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("A -> B"));

    // 失败的别名不会留下来
    assert!(!container.bound("A"));
}

/// 直接或间接依赖自身的类型报告循环依赖
#[test]
fn test_circular_dependency_is_detected() {
    init_test_logger();
    let container = Container::new();
    container.describe(
        TypeDescriptor::builder("Parent")
            .constructor(vec![ParameterDescriptor::typed("child", "Child")], |_| Ok(()))
            .build(),
    );
    container.describe(
        TypeDescriptor::builder("Child")
            .constructor(vec![ParameterDescriptor::typed("parent", "Parent")], |_| Ok(()))
            .build(),
    );
    container.describe(
        TypeDescriptor::builder("Narcissus")
            .constructor(vec![ParameterDescriptor::typed("me", "Narcissus")], |_| Ok(()))
            .build(),
    );

    match container.make("Parent", Overrides::new()) {
        Err(DependencyError::CircularDependency { dependency_chain }) => {
            assert_eq!(dependency_chain, "Parent -> Child -> Parent");
        }
        other => panic!("expected circular dependency, got {other:?}"),
    }
    assert!(container
        .make("Narcissus", Overrides::new())
        .unwrap_err()
        .is_circular());

    // 失败后构建栈已清空，其他解析不受影响
    describe_mail_stack(&container);
    assert!(container.make_as::<Mailer>("Mailer").is_ok());
}

/// 经由工厂形成的循环也能检测到
#[test]
fn test_circular_dependency_through_factory() {
    let container = Container::new();
    container.bind(
        "Ping",
        Concrete::factory(|resolver, _| resolver.make("Pong")),
        false,
    );
    container.bind(
        "Pong",
        Concrete::factory(|resolver, _| resolver.make("Ping")),
        false,
    );

    match container.make("Ping", Overrides::new()) {
        Err(DependencyError::CircularDependency { dependency_chain }) => {
            assert_eq!(dependency_chain, "Ping -> Pong -> Ping");
        }
        other => panic!("expected circular dependency, got {other:?}"),
    }
}

/// flush 之后单例会被重新构造
#[test]
fn test_flush_rebuilds_singletons() {
    let container = Container::new();
    let counter = describe_mail_stack(&container);
    container.singleton("Logger", Concrete::Abstract);
    let before = container.make_as::<Logger>("Logger").unwrap();

    container.flush();
    assert!(!container.bound("Logger"));

    container.singleton("Logger", Concrete::Abstract);
    let after = container.make_as::<Logger>("Logger").unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.serial, 2);
    assert_eq!(counter.count(), 2);
}

/// flush 同时清空当前容器的请求级实例
#[test]
fn test_flush_clears_scoped_instances() {
    let container = Container::new();
    container.share("Request", instance(1_u8));
    container.instance("Config", instance(2_u8));
    container.alias("Config", "Settings").unwrap();

    container.flush();

    assert!(!container.bound("Request"));
    assert!(!container.bound("Config"));
    assert!(!container.bound("Settings"));
}

/// 构造函数依赖被级联注入
#[test]
fn test_constructor_injection_cascades() {
    let container = Container::new();
    describe_mail_stack(&container);
    container.singleton("Logger", Concrete::Abstract);

    let mailer = container.make_as::<Mailer>("Mailer").unwrap();
    let logger = container.make_as::<Logger>("Logger").unwrap();

    assert!(Arc::ptr_eq(&mailer.logger, &logger));
    assert_eq!(mailer.sender, "noreply");
}

/// make 的覆盖表按参数名和类型名匹配构造参数
#[test]
fn test_make_overrides_constructor_parameters() {
    let container = Container::new();
    let counter = describe_mail_stack(&container);
    let logger = instance(Logger { serial: 7 });

    let mailer = container
        .make(
            "Mailer",
            Overrides::new()
                .with("sender", String::from("ops@example.com"))
                .with_instance("Logger", Arc::clone(&logger)),
        )
        .unwrap()
        .downcast::<Mailer>()
        .unwrap();

    assert_eq!(mailer.sender, "ops@example.com");
    assert_eq!(mailer.logger.serial, 7);
    // Logger 没有被构造
    assert_eq!(counter.count(), 0);
}

/// 绑定到另一个类型名
#[test]
fn test_class_binding_and_interfaces() {
    let container = Container::new();
    describe_mail_stack(&container);
    container.describe(TypeDescriptor::builder("LoggerContract").build());

    assert!(matches!(
        container.get("LoggerContract"),
        Err(DependencyError::NotInstantiable { type_name }) if type_name == "LoggerContract"
    ));

    container.singleton("LoggerContract", Concrete::class("Logger"));
    let contract = container.make_as::<Logger>("LoggerContract").unwrap();
    let again = container.make_as::<Logger>("LoggerContract").unwrap();
    assert!(Arc::ptr_eq(&contract, &again));

    // 未绑定也未描述
    assert!(matches!(
        container.get("Nothing"),
        Err(DependencyError::ComponentNotRegistered { .. })
    ));
}

/// 工厂接收覆盖表，返回值原样使用
#[test]
fn test_factory_binding_receives_overrides() {
    let container = Container::new();
    describe_mail_stack(&container);
    container.bind(
        "Mailer",
        Concrete::factory(|resolver, mut overrides| {
            let logger = resolver.make_as::<Logger>("Logger")?;
            let sender = overrides
                .take("sender")
                .and_then(|v| v.downcast::<String>().ok())
                .map_or_else(|| String::from("factory"), |s| (*s).clone());
            Ok(instance(Mailer { logger, sender }))
        }),
        false,
    );

    let default = container.make_as::<Mailer>("Mailer").unwrap();
    let custom = container
        .make(
            "Mailer",
            Overrides::new().with("sender", String::from("custom")),
        )
        .unwrap()
        .downcast::<Mailer>()
        .unwrap();

    assert_eq!(default.sender, "factory");
    assert_eq!(custom.sender, "custom");
}

/// bind_if 只在未绑定时生效
#[test]
fn test_bind_if() {
    let container = Container::new();
    describe_mail_stack(&container);

    assert!(container.bind_if("Logger", Concrete::Abstract, true));
    assert!(!container.bind_if("Logger", Concrete::class("Mailer"), false));

    let binding = container.registry().binding("Logger").unwrap();
    assert!(binding.shared);
    assert!(matches!(binding.concrete, Concrete::Abstract));

    container.share("Scoped", instance(1_u8));
    assert!(!container.bind_if("Scoped", Concrete::Abstract, false));
}

/// 重新绑定不会使已缓存的单例失效
#[test]
fn test_rebind_keeps_cached_instances() {
    let container = Container::new();
    describe_mail_stack(&container);
    container.singleton("Logger", Concrete::Abstract);
    let cached = container.make_as::<Logger>("Logger").unwrap();

    container.bind(
        "Logger",
        Concrete::factory(|_, _| Ok(instance(Logger { serial: 0 }))),
        false,
    );

    assert!(Arc::ptr_eq(&container.make_as::<Logger>("Logger").unwrap(), &cached));
}

/// 延迟解析句柄在调用时才解析
#[test]
fn test_deferred_factory() {
    let container = Container::new();
    let deferred = container.factory("Logger");

    // 句柄创建时 Logger 尚未描述
    describe_mail_stack(&container);
    container.singleton("Logger", Concrete::Abstract);

    let first = deferred().unwrap();
    let second = deferred().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

/// 构造失败时原样透传，且不会缓存半成品
#[test]
fn test_constructor_failure_propagates_and_is_not_cached() {
    let attempts = BuildCounter::default();
    let counter = attempts.clone();
    let container = Container::new();
    container.describe(
        TypeDescriptor::builder("Flaky")
            .constructor(Vec::new(), move |_| {
                if counter.hit() == 1 {
                    return Err(DependencyError::callee(anyhow::anyhow!("数据库不可用")));
                }
                Ok(String::from("connected"))
            })
            .build(),
    );
    container.singleton("Flaky", Concrete::Abstract);

    let err = container.get("Flaky").unwrap_err();
    assert!(matches!(err, DependencyError::Callee(_)));
    assert_eq!(err.to_string(), "数据库不可用");
    assert!(container.registry().resolved_instance("Flaky").is_none());

    let value = container.make_as::<String>("Flaky").unwrap();
    assert_eq!(value.as_str(), "connected");
    assert_eq!(attempts.count(), 2);
}

/// 超过配置的最大解析深度
#[test]
fn test_max_resolution_depth_from_config() {
    let config = ContainerConfig::from_toml_str("max_resolution_depth = 2").unwrap();
    let container = Container::with_config(config);
    for (name, dependency) in [("A", Some("B")), ("B", Some("C")), ("C", None)] {
        let parameters = dependency
            .map(|d| vec![ParameterDescriptor::typed("dep", d)])
            .unwrap_or_default();
        container.describe(
            TypeDescriptor::builder(name)
                .constructor(parameters, |_| Ok(()))
                .build(),
        );
    }

    assert!(container.get("B").is_ok());
    assert!(matches!(
        container.get("A"),
        Err(DependencyError::ResolutionTooDeep { max_depth: 2, .. })
    ));
}

/// 多个线程上的请求级容器共享同一个单例
#[test]
fn test_singleton_across_threads() {
    let root = Container::new();
    let counter = describe_mail_stack(&root);
    root.singleton("Logger", Concrete::Abstract);

    let loggers: Vec<Instance> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let request = root.new_scope();
                s.spawn(move || request.get("Logger").unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let cached = root.get("Logger").unwrap();
    assert!(loggers.iter().all(|l| Arc::ptr_eq(l, &cached)));
    assert!(counter.count() >= 1);
}
