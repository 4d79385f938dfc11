//! 部分失败对账
//!
//! 持久化成功而事件消息构造失败时，存储中的状态已经无法回滚。
//! 聚合存储据此生成 [`ReconciliationReport`]，先交给 [`ReconciliationHook`]，
//! 再以 `StoreError::UnpublishedEvents` 返回给调用方。
//!
use eskit_domain::error::DomainError;
use std::fmt;
use uuid::Uuid;

/// 一次部分失败的保存：哪些聚合已提交、哪个聚合失败、哪些事件没有进入缓冲区
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// 事件已推入缓冲区并完成提交的聚合
    pub committed_aggregates: Vec<Uuid>,
    pub failed_aggregate: Uuid,
    pub failed_aggregate_type: &'static str,
    /// 失败聚合及其后续聚合尚未发布的事件，按原顺序
    pub unpublished_events: Vec<Uuid>,
}

impl fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "aggregate {} ({}) failed after {} committed, {} event(s) unpublished",
            self.failed_aggregate,
            self.failed_aggregate_type,
            self.committed_aggregates.len(),
            self.unpublished_events.len()
        )
    }
}

/// 部分失败回调，在错误返回给调用方之前同步调用
pub trait ReconciliationHook: Send + Sync {
    fn on_unpublished_events(&self, report: &ReconciliationReport, error: &DomainError);
}

/// 默认实现：以 `error` 级别记录
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReconciliationHook;

impl ReconciliationHook for LoggingReconciliationHook {
    fn on_unpublished_events(&self, report: &ReconciliationReport, error: &DomainError) {
        tracing::error!(
            failed_aggregate = %report.failed_aggregate,
            aggregate_type = report.failed_aggregate_type,
            committed = report.committed_aggregates.len(),
            unpublished = report.unpublished_events.len(),
            error = %error,
            "state persisted but events were not published; manual reconciliation required"
        );
    }
}
