//! 存储配置
//!
//! 从 `ESKIT__` 前缀的环境变量加载，嵌套键以 `__` 分隔，例如：
//! - `ESKIT__NAMING=as_is`
//! - `ESKIT__LOG_FILTER=eskit_infra=debug`
//! - `ESKIT__EVENT_BUS_CAPACITY=256`
//!
//! 每个字段都有默认值，未设置任何变量时得到默认配置。
//!
use crate::in_memory::{InMemoryDatabase, InMemoryDatabaseBuilder};
use crate::naming::NamingStyle;
use eskit_domain::eventing::InMemoryEventBus;
use serde::Deserialize;
use thiserror::Error;

const ENV_PREFIX: &str = "ESKIT";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 表名命名风格
    pub naming: NamingStyle,
    /// `RUST_LOG` 未设置时使用的过滤规则
    pub log_filter: String,
    pub json_logs: bool,
    /// 内存事件总线的广播容量
    pub event_bus_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            naming: NamingStyle::default(),
            log_filter: "info".to_string(),
            json_logs: false,
            event_bus_capacity: 1024,
        }
    }
}

impl StoreConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(
            config::Environment::default()
                .prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
    }

    fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_bus_capacity == 0 {
            return Err(ConfigError::Invalid {
                reason: "event_bus_capacity must be greater than zero".to_string(),
            });
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "log_filter must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// 按配置的命名风格开始映射数据库
    pub fn database_builder(&self) -> InMemoryDatabaseBuilder {
        InMemoryDatabase::builder().naming_style(self.naming)
    }

    pub fn event_bus(&self) -> InMemoryEventBus {
        InMemoryEventBus::new(self.event_bus_capacity)
    }
}
