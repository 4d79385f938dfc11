//! 基础设施层错误定义
//!
use crate::aggregate_store::ReconciliationReport;
use eskit_domain::error::DomainError;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// 持久化已成功，但事件消息未能全部构造并推入缓冲区；需要人工对账
    #[error("saved but events left unpublished: {report}")]
    UnpublishedEvents {
        report: ReconciliationReport,
        source: DomainError,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(err) => Some(err),
            StoreError::UnpublishedEvents { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.domain().is_some_and(DomainError::is_not_found)
    }

    pub fn is_persistence(&self) -> bool {
        self.domain().is_some_and(DomainError::is_persistence)
    }

    pub fn report(&self) -> Option<&ReconciliationReport> {
        match self {
            StoreError::UnpublishedEvents { report, .. } => Some(report),
            StoreError::Domain(_) => None,
        }
    }
}
