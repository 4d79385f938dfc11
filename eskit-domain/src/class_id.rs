//! 类标识（ClassId）
//!
//! 与运行时类型信息无关的稳定类型标识，跨进程重启与模式演进保持不变，
//! 用于标记持久化行与对外事件的元数据。
//!
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// 实体具体类型的稳定标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct ClassId(Uuid);

impl ClassId {
    /// 从 UUID 创建类标识；空 UUID 视为“未设置”，不允许作为类标识
    pub fn new(value: Uuid) -> DomainResult<Self> {
        if value.is_nil() {
            return Err(DomainError::InvalidValue {
                reason: "class id must not be nil".to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Uuid> for ClassId {
    type Error = DomainError;

    fn try_from(value: Uuid) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClassId> for Uuid {
    fn from(class_id: ClassId) -> Self {
        class_id.0
    }
}

impl FromStr for ClassId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Uuid::parse_str(s)?;
        Self::new(value)
    }
}

/// 反序列化可选类标识：缺失、`null` 与空 UUID 都视为未设置
///
/// 供 `#[aggregate]`/`#[entity]` 生成的 `class_id` 字段使用。
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<ClassId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Uuid>::deserialize(deserializer)?;
    Ok(value.filter(|uuid| !uuid.is_nil()).map(ClassId))
}

/// 参与类标识标记的实体
///
/// 类标识一旦设置即不再改变，由聚合存储在首次持久化前注入。
pub trait ClassIdEntity {
    fn class_id(&self) -> Option<ClassId>;

    fn set_class_id(&mut self, class_id: ClassId);
}
