//! 工作单元（Unit of Work）
//!
//! 每个工作单元持有一个聚合存储与独享的发布缓冲区。保存成功后由工作单元
//! 决定何时把缓冲区中的消息交给事件总线，聚合存储本身从不投递。
//!
use crate::aggregate_store::{
    AggregateStore, CrudAggregateStore, LoggingReconciliationHook, ReconciliationHook, SaveSummary,
};
use crate::error::StoreResult;
use crate::in_memory::{InMemoryCrudRepository, InMemoryDatabase};
use eskit_domain::entity_type::EntityTypeManager;
use eskit_domain::eventing::{
    EventBus, EventMessage, EventMessageFactory, InMemoryPublishEventBuffer, PublishEventBuffer,
    flush_buffer,
};
use eskit_domain::persist::CrudRepository;
use std::sync::Arc;

/// 异步完成的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub summary: SaveSummary,
    /// 交给事件总线的消息数；总线无订阅者时这些消息同样计入
    pub delivered: usize,
}

pub struct UnitOfWork<R> {
    store: CrudAggregateStore<R>,
    buffer: Arc<InMemoryPublishEventBuffer>,
    bus: Arc<dyn EventBus>,
}

impl<R: CrudRepository> UnitOfWork<R> {
    pub fn new(
        repository: R,
        entity_types: Arc<dyn EntityTypeManager>,
        message_factory: Arc<dyn EventMessageFactory>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        let buffer = Arc::new(InMemoryPublishEventBuffer::new());
        let store = CrudAggregateStore::new(repository, entity_types, message_factory, buffer.clone());
        Self { store, buffer, bus }
    }

    pub fn with_reconciliation_hook(mut self, hook: Arc<dyn ReconciliationHook>) -> Self {
        self.store = self.store.with_reconciliation_hook(hook);
        self
    }

    pub fn store(&mut self) -> &mut CrudAggregateStore<R> {
        &mut self.store
    }

    /// 已保存但尚未投递的消息数
    pub fn pending_messages(&self) -> usize {
        self.buffer.len()
    }

    /// 同步保存；消息留在缓冲区
    pub fn commit(&mut self) -> StoreResult<SaveSummary> {
        self.store.save_changes()
    }

    pub async fn commit_async(&mut self) -> StoreResult<SaveSummary> {
        self.store.save_changes_async().await
    }

    /// 按顺序投递缓冲区中的消息；失败的消息及其后续消息留在缓冲区，可重试
    ///
    /// 投递成功只表示总线接受了消息。[`InMemoryEventBus`] 在没有订阅者时
    /// 直接丢弃消息并返回成功，这些消息同样会移出缓冲区。
    ///
    /// [`InMemoryEventBus`]: eskit_domain::eventing::InMemoryEventBus
    pub async fn publish(&self) -> StoreResult<usize> {
        let delivered = flush_buffer(self.buffer.as_ref(), self.bus.as_ref()).await?;
        tracing::debug!(delivered, "buffered events delivered");
        Ok(delivered)
    }

    /// 同步完成：保存后取走缓冲区中的全部消息交给调用方投递
    pub fn complete(&mut self) -> StoreResult<Vec<EventMessage>> {
        self.commit()?;
        Ok(self.buffer.drain())
    }

    /// 异步完成：保存后投递到事件总线
    pub async fn complete_async(&mut self) -> StoreResult<Completion> {
        let summary = self.commit_async().await?;
        let delivered = self.publish().await?;
        Ok(Completion { summary, delivered })
    }
}

/// 在共享的内存数据库之上开启工作单元
#[derive(Clone)]
pub struct InMemoryUnitOfWorkFactory {
    database: InMemoryDatabase,
    entity_types: Arc<dyn EntityTypeManager>,
    message_factory: Arc<dyn EventMessageFactory>,
    bus: Arc<dyn EventBus>,
    reconciliation: Arc<dyn ReconciliationHook>,
}

impl InMemoryUnitOfWorkFactory {
    pub fn new(
        database: InMemoryDatabase,
        entity_types: Arc<dyn EntityTypeManager>,
        message_factory: Arc<dyn EventMessageFactory>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            database,
            entity_types,
            message_factory,
            bus,
            reconciliation: Arc::new(LoggingReconciliationHook),
        }
    }

    pub fn with_reconciliation_hook(mut self, hook: Arc<dyn ReconciliationHook>) -> Self {
        self.reconciliation = hook;
        self
    }

    pub fn database(&self) -> &InMemoryDatabase {
        &self.database
    }

    pub fn begin(&self) -> UnitOfWork<InMemoryCrudRepository> {
        UnitOfWork::new(
            InMemoryCrudRepository::new(self.database.clone()),
            self.entity_types.clone(),
            self.message_factory.clone(),
            self.bus.clone(),
        )
        .with_reconciliation_hook(self.reconciliation.clone())
    }
}
