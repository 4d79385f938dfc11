//! 领域层统一错误定义
//!
//! 覆盖查找、类型注册、持久化、消息构造与事件总线等最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use thiserror::Error;
use uuid::Uuid;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化/解析 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },

    // --- 类型注册 ---
    #[error("unknown entity type: {type_name}")]
    UnknownType { type_name: String },

    // --- 仓储/持久化 ---
    #[error("not found: {reason}")]
    NotFound { reason: String },
    #[error("persistence error: {reason}")]
    Persistence { reason: String },
    #[error("version conflict: entity={entity}, expected={expected}, actual={actual}")]
    VersionConflict {
        entity: String,
        expected: usize,
        actual: usize,
    },

    // --- 事件消息 ---
    #[error("message construction failed: event={event_id}, reason={reason}")]
    MessageConstruction { event_id: Uuid, reason: String },
    #[error("event bus error: {reason}")]
    EventBus { reason: String },

    // --- 领域规则 ---
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found(reason: impl Into<String>) -> Self {
        DomainError::NotFound {
            reason: reason.into(),
        }
    }

    pub fn persistence(reason: impl Into<String>) -> Self {
        DomainError::Persistence {
            reason: reason.into(),
        }
    }

    pub fn event_bus(reason: impl Into<String>) -> Self {
        DomainError::EventBus {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    /// 存储层拒绝写入（约束冲突或并发冲突）
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            DomainError::Persistence { .. } | DomainError::VersionConflict { .. }
        )
    }
}

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}
