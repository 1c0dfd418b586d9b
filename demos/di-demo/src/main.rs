//! Lorn Container 示例应用
//!
//! 演示类型描述、单例、请求级实例和方法调用注入

use anyhow::Result;
use clap::Parser;
use di_impl::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "di-demo")]
#[command(about = "Lorn Container 示例应用")]
struct Args {
    /// 容器配置文件路径（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// 收件人
    #[arg(short, long, default_value = "ops@example.com")]
    to: String,
}

#[derive(Debug)]
struct Clock {
    ticks: AtomicUsize,
}

impl Clock {
    fn tick(&self) -> usize {
        self.ticks.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[derive(Debug)]
struct Notifier {
    clock: Arc<Clock>,
    channel: String,
}

#[derive(Debug)]
struct RequestId(String);

fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .with_target(false)
        .init();

    info!("启动 Lorn Container 示例应用");

    let container = build_container(&args)?;

    demonstrate_resolution(&container)?;
    demonstrate_call(&container, &args.to)?;
    demonstrate_scopes(&container)?;

    info!("示例结束");
    Ok(())
}

/// 构建容器并注册类型描述
fn build_container(args: &Args) -> Result<Container> {
    let config = match &args.config {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(path)?;
            ContainerConfig::from_toml_str(&content)?
        }
        Some(path) => {
            warn!("配置文件不存在，使用默认配置: {}", path.display());
            ContainerConfig::default()
        }
        None => ContainerConfig::default(),
    };
    info!("最大解析深度: {}", config.max_resolution_depth);

    let container = Container::with_config(config);

    container.describe(
        TypeDescriptor::builder("Clock")
            .constructor(Vec::new(), |_| {
                Ok(Clock {
                    ticks: AtomicUsize::new(0),
                })
            })
            .build(),
    );
    container.describe(
        TypeDescriptor::builder("Notifier")
            .constructor(
                vec![
                    ParameterDescriptor::typed("clock", "Clock"),
                    ParameterDescriptor::named("channel").with_default(String::from("email")),
                ],
                |args| {
                    Ok(Notifier {
                        clock: args.get::<Clock>(0)?,
                        channel: args.value::<String>(1)?,
                    })
                },
            )
            .instance_method::<Notifier, String, _>(
                "notify",
                vec![
                    ParameterDescriptor::named("to"),
                    ParameterDescriptor::named("subject").with_default(String::from("hello")),
                ],
                |this, args| {
                    Ok(format!(
                        "[{} #{}] {} <- {}",
                        this.channel,
                        this.clock.tick(),
                        args.value::<String>(0)?,
                        args.value::<String>(1)?
                    ))
                },
            )
            .build(),
    );

    container.singleton("Clock", Concrete::Abstract);
    container.bind("notifier", Concrete::class("Notifier"), false);
    container.alias("Notifier", "notifications")?;

    Ok(container)
}

/// 演示类型解析
fn demonstrate_resolution(container: &Container) -> Result<()> {
    info!("演示类型解析");

    let first = container.make_as::<Notifier>("notifier")?;
    let second = container.make_as::<Notifier>("notifications")?;
    info!(
        "两个通知器共享时钟: {}",
        Arc::ptr_eq(&first.clock, &second.clock)
    );

    let sms = container.make(
        "Notifier",
        Overrides::new().with("channel", String::from("sms")),
    )?;
    let sms = sms
        .downcast::<Notifier>()
        .map_err(|_| anyhow::anyhow!("Notifier 类型不匹配"))?;
    info!("覆盖构造参数后的通道: {}", sms.channel);

    Ok(())
}

/// 演示方法调用注入
fn demonstrate_call(container: &Container, to: &str) -> Result<()> {
    info!("演示方法调用注入");

    let message = container.call_as::<String>(
        "Notifier::notify",
        Overrides::new().with("to", to.to_string()),
    )?;
    info!("调用结果: {}", message);

    let elapsed = container.call_as::<usize>(
        Callable::closure(
            "elapsed",
            vec![ParameterDescriptor::typed("clock", "Clock")],
            |args| Ok(args.get::<Clock>(0)?.tick()),
        ),
        Overrides::new(),
    )?;
    info!("时钟计数: {}", elapsed);

    Ok(())
}

/// 演示请求级实例
fn demonstrate_scopes(container: &Container) -> Result<()> {
    info!("演示请求级实例");

    for n in 0..2 {
        let request = container.new_scope();
        request.share("RequestId", instance(RequestId(format!("req-{n}"))));

        let id = request.make_as::<RequestId>("RequestId")?;
        info!(scope = %request.scope_id(), "当前请求: {}", id.0);
    }

    // 请求级实例不会泄露到原容器
    match container.make("RequestId", Overrides::new()) {
        Ok(_) => warn!("请求级实例意外可见"),
        Err(e) => info!("原容器中不可见: {}", e),
    }

    Ok(())
}

fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
