//! 组合聚合存储
//!
//! 按聚合类型把操作路由到第一个能处理该类型的存储，
//! 常用于同一工作单元内跨两个存储模型的聚合。
//!
use super::{AggregateStore, SaveSummary};
use crate::error::StoreResult;
use async_trait::async_trait;
use eskit_domain::aggregate::Aggregate;
use eskit_domain::aggregate_root::AggregateRoot;
use eskit_domain::entity_type::EntityTypeKey;
use eskit_domain::error::DomainError;
use eskit_domain::persist::Query;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Primary,
    Secondary,
}

pub struct RoutingAggregateStore<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> RoutingAggregateStore<P, S>
where
    P: AggregateStore,
    S: AggregateStore,
{
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    pub fn into_parts(self) -> (P, S) {
        (self.primary, self.secondary)
    }

    fn route<T: Aggregate>(&self) -> StoreResult<Route> {
        let key = EntityTypeKey::of::<T>();
        if self.primary.can_handle_aggregate_type(key) {
            Ok(Route::Primary)
        } else if self.secondary.can_handle_aggregate_type(key) {
            Ok(Route::Secondary)
        } else {
            Err(DomainError::UnknownType {
                type_name: key.name().to_string(),
            }
            .into())
        }
    }
}

#[async_trait]
impl<P, S> AggregateStore for RoutingAggregateStore<P, S>
where
    P: AggregateStore,
    S: AggregateStore,
{
    fn add<T: Aggregate>(&mut self, aggregate: T) -> StoreResult<()> {
        match self.route::<T>()? {
            Route::Primary => self.primary.add(aggregate),
            Route::Secondary => self.secondary.add(aggregate),
        }
    }

    fn get<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<&mut T> {
        match self.route::<T>()? {
            Route::Primary => self.primary.get(id),
            Route::Secondary => self.secondary.get(id),
        }
    }

    async fn get_async<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<&mut T> {
        match self.route::<T>()? {
            Route::Primary => self.primary.get_async(id).await,
            Route::Secondary => self.secondary.get_async(id).await,
        }
    }

    fn find<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<Option<&mut T>> {
        match self.route::<T>()? {
            Route::Primary => self.primary.find(id),
            Route::Secondary => self.secondary.find(id),
        }
    }

    async fn find_async<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<Option<&mut T>> {
        match self.route::<T>()? {
            Route::Primary => self.primary.find_async(id).await,
            Route::Secondary => self.secondary.find_async(id).await,
        }
    }

    fn first_or_default<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<Option<&mut T>> {
        match self.route::<T>()? {
            Route::Primary => self.primary.first_or_default(query),
            Route::Secondary => self.secondary.first_or_default(query),
        }
    }

    async fn first_or_default_async<T: Aggregate>(
        &mut self,
        query: &Query<T>,
    ) -> StoreResult<Option<&mut T>> {
        match self.route::<T>()? {
            Route::Primary => self.primary.first_or_default_async(query).await,
            Route::Secondary => self.secondary.first_or_default_async(query).await,
        }
    }

    fn first<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<&mut T> {
        match self.route::<T>()? {
            Route::Primary => self.primary.first(query),
            Route::Secondary => self.secondary.first(query),
        }
    }

    async fn first_async<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<&mut T> {
        match self.route::<T>()? {
            Route::Primary => self.primary.first_async(query).await,
            Route::Secondary => self.secondary.first_async(query).await,
        }
    }

    fn fetch<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<Vec<&mut T>> {
        match self.route::<T>()? {
            Route::Primary => self.primary.fetch(query),
            Route::Secondary => self.secondary.fetch(query),
        }
    }

    async fn fetch_async<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<Vec<&mut T>> {
        match self.route::<T>()? {
            Route::Primary => self.primary.fetch_async(query).await,
            Route::Secondary => self.secondary.fetch_async(query).await,
        }
    }

    fn remove<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<()> {
        match self.route::<T>()? {
            Route::Primary => self.primary.remove::<T>(id),
            Route::Secondary => self.secondary.remove::<T>(id),
        }
    }

    fn tracked_aggregates(&self) -> Vec<&dyn AggregateRoot> {
        let mut tracked = self.primary.tracked_aggregates();
        tracked.extend(self.secondary.tracked_aggregates());
        tracked
    }

    fn can_handle_aggregate_type(&self, key: EntityTypeKey) -> bool {
        self.primary.can_handle_aggregate_type(key) || self.secondary.can_handle_aggregate_type(key)
    }

    /// 先保存主存储；主存储失败时不再保存次存储
    fn save_changes(&mut self) -> StoreResult<SaveSummary> {
        let primary = self.primary.save_changes()?;
        let secondary = self.secondary.save_changes()?;
        Ok(primary + secondary)
    }

    async fn save_changes_async(&mut self) -> StoreResult<SaveSummary> {
        let primary = self.primary.save_changes_async().await?;
        let secondary = self.secondary.save_changes_async().await?;
        Ok(primary + secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate_store::CrudAggregateStore;
    use crate::in_memory::{InMemoryCrudRepository, InMemoryDatabase};
    use eskit_domain::class_id::ClassId;
    use eskit_domain::entity::Entity;
    use eskit_domain::entity_type::EntityTypeRegistry;
    use eskit_domain::eventing::{
        DefaultEventMessageFactory, InMemoryPublishEventBuffer, PublishEventBuffer,
    };
    use eskit_macros::{aggregate, domain_event};
    use std::sync::Arc;

    #[aggregate]
    struct Account {
        balance: i64,
    }

    #[domain_event]
    enum AccountEvent {
        Deposited { amount: i64 },
    }

    impl Aggregate for Account {
        type Event = AccountEvent;

        fn apply(&mut self, event: &Self::Event) {
            match event {
                AccountEvent::Deposited { amount } => self.balance += amount,
            }
        }
    }

    #[aggregate]
    struct Ledger {
        entries: u32,
    }

    #[domain_event]
    enum LedgerEvent {
        Posted,
    }

    impl Aggregate for Ledger {
        type Event = LedgerEvent;

        fn apply(&mut self, _event: &Self::Event) {
            self.entries += 1;
        }
    }

    #[aggregate]
    struct Orphan {}

    #[domain_event]
    enum OrphanEvent {
        Noted,
    }

    impl Aggregate for Orphan {
        type Event = OrphanEvent;

        fn apply(&mut self, _event: &Self::Event) {}
    }

    fn store_for(
        database: InMemoryDatabase,
        registry: Arc<EntityTypeRegistry>,
        buffer: Arc<InMemoryPublishEventBuffer>,
    ) -> CrudAggregateStore<InMemoryCrudRepository> {
        CrudAggregateStore::new(
            InMemoryCrudRepository::new(database),
            registry,
            Arc::new(DefaultEventMessageFactory::new()),
            buffer,
        )
    }

    fn routing() -> (
        RoutingAggregateStore<
            CrudAggregateStore<InMemoryCrudRepository>,
            CrudAggregateStore<InMemoryCrudRepository>,
        >,
        Arc<InMemoryPublishEventBuffer>,
    ) {
        let registry = Arc::new(
            EntityTypeRegistry::builder()
                .register::<Account>(ClassId::new(Uuid::new_v4()).unwrap())
                .and_then(|b| b.register::<Ledger>(ClassId::new(Uuid::new_v4()).unwrap()))
                .unwrap()
                .build(),
        );
        let buffer = Arc::new(InMemoryPublishEventBuffer::new());
        let accounts = InMemoryDatabase::builder().map::<Account>().unwrap().build();
        let ledgers = InMemoryDatabase::builder().map::<Ledger>().unwrap().build();

        let store = RoutingAggregateStore::new(
            store_for(accounts, registry.clone(), buffer.clone()),
            store_for(ledgers, registry, buffer.clone()),
        );
        (store, buffer)
    }

    #[test]
    fn routes_each_type_to_its_store() {
        let (mut store, buffer) = routing();

        let mut account = Account::new(Uuid::new_v4(), 0);
        account.raise(AccountEvent::Deposited { amount: 10 });
        let mut ledger = Ledger::new(Uuid::new_v4(), 0);
        ledger.raise(LedgerEvent::Posted);
        let ledger_id = ledger.id();

        store.add(account).unwrap();
        store.add(ledger).unwrap();
        assert_eq!(store.primary().tracked_aggregates().len(), 1);
        assert_eq!(store.secondary().tracked_aggregates().len(), 1);
        assert_eq!(store.tracked_aggregates().len(), 2);

        let summary = store.save_changes().unwrap();
        assert_eq!(summary.written, 2);
        assert_eq!(summary.published, 2);
        assert_eq!(buffer.len(), 2);

        assert_eq!(store.get::<Ledger>(ledger_id).unwrap().entries, 1);
    }

    #[test]
    fn unroutable_types_are_rejected() {
        let (mut store, _) = routing();
        assert!(!store.can_handle_aggregate_type(EntityTypeKey::of::<Orphan>()));

        let err = store.add(Orphan::new(Uuid::new_v4(), 0)).unwrap_err();
        assert!(matches!(
            err.domain(),
            Some(DomainError::UnknownType { .. })
        ));
    }

    #[tokio::test]
    async fn async_paths_route_the_same_way() {
        let (mut store, buffer) = routing();
        let mut ledger = Ledger::new(Uuid::new_v4(), 0);
        ledger.raise(LedgerEvent::Posted);
        let id = ledger.id();
        store.add(ledger).unwrap();

        store.save_changes_async().await.unwrap();
        assert!(store.find_async::<Ledger>(id).await.unwrap().is_some());
        assert!(store.find_async::<Account>(id).await.unwrap().is_none());
        assert_eq!(buffer.len(), 1);
    }
}
