//! 基于 CRUD 仓储的聚合存储
//!
use super::reconciliation::{LoggingReconciliationHook, ReconciliationHook, ReconciliationReport};
use super::{AggregateStore, SaveSummary};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use eskit_domain::aggregate::Aggregate;
use eskit_domain::aggregate_root::AggregateRoot;
use eskit_domain::entity_type::{EntityTypeKey, EntityTypeManager};
use eskit_domain::error::DomainError;
use eskit_domain::eventing::{EventMessageDraft, EventMessageFactory, PublishEventBuffer, metadata};
use eskit_domain::persist::{CrudRepository, EntityState, Query};
use std::sync::Arc;
use uuid::Uuid;

/// 已变更的聚合及其类型键（提交阶段的遍历单元）
type Changed<'a> = (EntityTypeKey, &'a mut dyn AggregateRoot);

/// 聚合存储：仓储负责状态，缓冲区接收事件消息
///
/// 标记阶段依赖类型注册表：参与标记的实体类型必须已注册，否则保存在写入之前中止。
pub struct CrudAggregateStore<R> {
    repository: R,
    entity_types: Arc<dyn EntityTypeManager>,
    message_factory: Arc<dyn EventMessageFactory>,
    buffer: Arc<dyn PublishEventBuffer>,
    reconciliation: Arc<dyn ReconciliationHook>,
}

impl<R: CrudRepository> CrudAggregateStore<R> {
    pub fn new(
        repository: R,
        entity_types: Arc<dyn EntityTypeManager>,
        message_factory: Arc<dyn EventMessageFactory>,
        buffer: Arc<dyn PublishEventBuffer>,
    ) -> Self {
        Self {
            repository,
            entity_types,
            message_factory,
            buffer,
            reconciliation: Arc::new(LoggingReconciliationHook),
        }
    }

    pub fn with_reconciliation_hook(mut self, hook: Arc<dyn ReconciliationHook>) -> Self {
        self.reconciliation = hook;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    pub fn buffer(&self) -> &Arc<dyn PublishEventBuffer> {
        &self.buffer
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// 标记阶段：为待写入且尚无类标识的实体补写类标识
    fn tag_class_ids(&mut self) -> StoreResult<usize> {
        let mut tagged = 0;
        let pending = self
            .repository
            .entities_mut(&[EntityState::Added, EntityState::Modified])?;

        for entity in pending {
            let key = entity.entity_type();
            let Some(target) = entity.class_id_entity_mut() else {
                continue;
            };
            if target.class_id().is_some() {
                continue;
            }

            let class_id = self.entity_types.get_class_id_by_type(key)?;
            target.set_class_id(class_id);
            tracing::debug!(entity_type = %key, %class_id, "assigned class id");
            tagged += 1;
        }

        Ok(tagged)
    }

    /// 提交阶段（同步）：逐个聚合构造消息、推入缓冲区、清空未提交事件
    fn commit_aggregates(&mut self) -> StoreResult<(usize, usize)> {
        let Self {
            repository,
            entity_types,
            message_factory,
            buffer,
            reconciliation,
        } = self;

        let mut changed = changed_aggregates(repository);
        let mut committed = Vec::with_capacity(changed.len());
        let mut published = 0;

        for position in 0..changed.len() {
            let (key, root) = &mut changed[position];
            let drafts: Result<Vec<_>, _> = root
                .uncommitted_events()
                .iter()
                .map(|event| message_factory.create_message(event))
                .collect();

            let drafts = match drafts {
                Ok(drafts) => drafts,
                Err(error) => {
                    return Err(unpublished(
                        reconciliation.as_ref(),
                        committed,
                        &changed,
                        position,
                        error,
                    ));
                }
            };

            published += push_stamped(entity_types.as_ref(), buffer.as_ref(), *key, drafts);
            root.commit();
            committed.push(root.id());
        }

        Ok((committed.len(), published))
    }

    /// 提交阶段（异步）：与同步版本逐步一致，只在构造消息处等待
    async fn commit_aggregates_async(&mut self) -> StoreResult<(usize, usize)> {
        let Self {
            repository,
            entity_types,
            message_factory,
            buffer,
            reconciliation,
        } = self;

        let mut changed = changed_aggregates(repository);
        let mut committed = Vec::with_capacity(changed.len());
        let mut published = 0;

        for position in 0..changed.len() {
            let (key, root) = &mut changed[position];
            let mut drafts = Vec::with_capacity(root.uncommitted_events().len());
            let mut failure = None;
            for event in root.uncommitted_events() {
                match message_factory.create_message_async(event).await {
                    Ok(draft) => drafts.push(draft),
                    Err(error) => {
                        failure = Some(error);
                        break;
                    }
                }
            }

            if let Some(error) = failure {
                return Err(unpublished(
                    reconciliation.as_ref(),
                    committed,
                    &changed,
                    position,
                    error,
                ));
            }

            published += push_stamped(entity_types.as_ref(), buffer.as_ref(), *key, drafts);
            root.commit();
            committed.push(root.id());
        }

        Ok((committed.len(), published))
    }
}

/// 会话中 `is_changed()` 为真的聚合，按纳入跟踪的顺序
fn changed_aggregates<R: CrudRepository>(repository: &mut R) -> Vec<Changed<'_>> {
    repository
        .tracked_entities_mut()
        .into_iter()
        .filter_map(|entity| {
            let key = entity.entity_type();
            entity.aggregate_root_mut().map(|root| (key, root))
        })
        .filter(|(_, root)| root.is_changed())
        .collect()
}

/// 写入聚合类标识（尽力而为，未注册则不写）后按顺序推入缓冲区
fn push_stamped(
    entity_types: &dyn EntityTypeManager,
    buffer: &dyn PublishEventBuffer,
    key: EntityTypeKey,
    mut drafts: Vec<EventMessageDraft>,
) -> usize {
    if let Some(class_id) = entity_types.try_get_class_id_by_type(key) {
        let class_id = class_id.to_string();
        for draft in &mut drafts {
            draft.set_metadata(metadata::AGGREGATE_CLASS_ID, class_id.as_str());
        }
    }

    let count = drafts.len();
    for draft in drafts {
        buffer.push_event(draft);
    }
    count
}

fn unpublished(
    hook: &dyn ReconciliationHook,
    committed: Vec<Uuid>,
    changed: &[Changed<'_>],
    position: usize,
    error: DomainError,
) -> StoreError {
    let (key, failed) = &changed[position];
    let report = ReconciliationReport {
        committed_aggregates: committed,
        failed_aggregate: failed.id(),
        failed_aggregate_type: key.name(),
        unpublished_events: changed[position..]
            .iter()
            .flat_map(|(_, root)| root.uncommitted_events().iter().map(|event| event.event_id()))
            .collect(),
    };

    hook.on_unpublished_events(&report, &error);
    StoreError::UnpublishedEvents {
        report,
        source: error,
    }
}

#[async_trait]
impl<R: CrudRepository> AggregateStore for CrudAggregateStore<R> {
    fn add<T: Aggregate>(&mut self, aggregate: T) -> StoreResult<()> {
        Ok(self.repository.add(aggregate)?)
    }

    fn get<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<&mut T> {
        Ok(self.repository.get::<T>(id)?)
    }

    async fn get_async<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<&mut T> {
        Ok(self.repository.get_async::<T>(id).await?)
    }

    fn find<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<Option<&mut T>> {
        Ok(self.repository.find::<T>(id)?)
    }

    async fn find_async<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<Option<&mut T>> {
        Ok(self.repository.find_async::<T>(id).await?)
    }

    fn first_or_default<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<Option<&mut T>> {
        Ok(self.repository.first_or_default(query)?)
    }

    async fn first_or_default_async<T: Aggregate>(
        &mut self,
        query: &Query<T>,
    ) -> StoreResult<Option<&mut T>> {
        Ok(self.repository.first_or_default_async(query).await?)
    }

    fn first<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<&mut T> {
        Ok(self.repository.first(query)?)
    }

    async fn first_async<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<&mut T> {
        Ok(self.repository.first_async(query).await?)
    }

    fn fetch<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<Vec<&mut T>> {
        Ok(self.repository.fetch(query)?)
    }

    async fn fetch_async<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<Vec<&mut T>> {
        Ok(self.repository.fetch_async(query).await?)
    }

    fn remove<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<()> {
        Ok(self.repository.remove::<T>(id)?)
    }

    fn tracked_aggregates(&self) -> Vec<&dyn AggregateRoot> {
        self.repository
            .tracked_entities()
            .into_iter()
            .filter_map(|entity| entity.aggregate_root())
            .collect()
    }

    fn can_handle_aggregate_type(&self, key: EntityTypeKey) -> bool {
        self.repository.is_type_mapped(key)
    }

    fn save_changes(&mut self) -> StoreResult<SaveSummary> {
        let tagged = self.tag_class_ids()?;
        let written = self.repository.save_changes()?;
        tracing::debug!(tagged, written, "aggregate state persisted");

        let (committed, published) = self.commit_aggregates()?;
        tracing::debug!(committed, published, "aggregate events buffered");

        Ok(SaveSummary {
            tagged,
            written,
            committed,
            published,
        })
    }

    async fn save_changes_async(&mut self) -> StoreResult<SaveSummary> {
        let tagged = self.tag_class_ids()?;
        let written = self.repository.save_changes_async().await?;
        tracing::debug!(tagged, written, "aggregate state persisted");

        let (committed, published) = self.commit_aggregates_async().await?;
        tracing::debug!(committed, published, "aggregate events buffered");

        Ok(SaveSummary {
            tagged,
            written,
            committed,
            published,
        })
    }
}
