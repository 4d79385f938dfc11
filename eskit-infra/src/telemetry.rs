//! 日志初始化
//!
use crate::config::StoreConfig;
use tracing_subscriber::EnvFilter;

/// 安装全局 `tracing` 订阅者
///
/// `RUST_LOG` 优先，否则使用配置中的过滤规则。已安装过订阅者时返回 `false`，
/// 重复调用无副作用。
pub fn init_tracing(config: &StoreConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}
