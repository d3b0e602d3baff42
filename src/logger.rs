//! 控制台日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 默认级别为 info，可通过 `RUST_LOG` 覆盖。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // 测试中可能被多次调用，重复初始化直接忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
