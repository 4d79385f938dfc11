//! 表名命名约定
//!
//! 逻辑表名（实体类型声明的 `TABLE`）映射为物理表名的可替换规则，
//! 与保存协议的正确性无关。
//!
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

pub trait NamingConvention: fmt::Debug + Send + Sync {
    fn table_name(&self, logical: &str) -> String;
}

/// 原样保留
#[derive(Debug, Clone, Copy, Default)]
pub struct AsIsConvention;

impl NamingConvention for AsIsConvention {
    fn table_name(&self, logical: &str) -> String {
        logical.to_string()
    }
}

/// 全部小写
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerCaseConvention;

impl NamingConvention for LowerCaseConvention {
    fn table_name(&self, logical: &str) -> String {
        logical.to_lowercase()
    }
}

/// 可配置的命名风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStyle {
    AsIs,
    #[default]
    LowerCase,
}

impl NamingStyle {
    pub fn convention(self) -> Arc<dyn NamingConvention> {
        match self {
            NamingStyle::AsIs => Arc::new(AsIsConvention),
            NamingStyle::LowerCase => Arc::new(LowerCaseConvention),
        }
    }
}
