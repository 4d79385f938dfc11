#![allow(dead_code)]

use eskit_domain::aggregate::Aggregate;
use eskit_domain::aggregate_root::{AggregateChanges, AggregateRoot};
use eskit_domain::class_id::{ClassId, ClassIdEntity};
use eskit_domain::entity::Entity;
use eskit_domain::entity_type::EntityTypeRegistry;
use eskit_domain::error::DomainError;
use eskit_domain::eventing::{DefaultEventMessageFactory, InMemoryPublishEventBuffer};
use eskit_domain::persist::PersistentEntity;
use eskit_infra::{
    CrudAggregateStore, InMemoryCrudRepository, InMemoryDatabase, ReconciliationHook,
    ReconciliationReport,
};
use eskit_macros::{aggregate, domain_event};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub type Store = CrudAggregateStore<InMemoryCrudRepository>;

// -------- Order：已注册的聚合 --------

#[aggregate(table = "Orders")]
pub struct Order {
    pub customer: String,
    pub items: Vec<String>,
    pub flagged: bool,
}

/// 无法序列化的载荷字段
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Unencodable;

impl Serialize for Unencodable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("reason cannot be encoded"))
    }
}

#[domain_event]
pub enum OrderEvent {
    Created { customer: String },
    ItemAdded { sku: String },
    Flagged { reason: Unencodable },
}

impl Aggregate for Order {
    type Event = OrderEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::Created { customer } => self.customer = customer.clone(),
            OrderEvent::ItemAdded { sku } => self.items.push(sku.clone()),
            OrderEvent::Flagged { .. } => self.flagged = true,
        }
    }
}

impl Order {
    pub fn create(customer: &str) -> Self {
        let mut order = Order::new(Uuid::new_v4(), 0);
        order.raise(OrderEvent::Created {
            customer: customer.to_string(),
        });
        order
    }

    pub fn add_item(&mut self, sku: &str) {
        self.raise(OrderEvent::ItemAdded {
            sku: sku.to_string(),
        });
    }

    pub fn flag(&mut self) {
        self.raise(OrderEvent::Flagged {
            reason: Unencodable,
        });
    }
}

// -------- Note：未注册、不带类标识的聚合 --------

#[aggregate(table = "notes", class_id = false)]
pub struct Note {
    pub text: String,
}

#[domain_event]
pub enum NoteEvent {
    Written { text: String },
}

impl Aggregate for Note {
    type Event = NoteEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            NoteEvent::Written { text } => self.text = text.clone(),
        }
    }
}

impl Note {
    pub fn written(text: &str) -> Self {
        let mut note = Note::new(Uuid::new_v4(), 0);
        note.raise(NoteEvent::Written {
            text: text.to_string(),
        });
        note
    }
}

// -------- Spy：手写实现，统计 commit 调用次数 --------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spy {
    id: Uuid,
    version: usize,
    #[serde(default, deserialize_with = "eskit_domain::class_id::deserialize_optional")]
    class_id: Option<ClassId>,
    #[serde(skip)]
    changes: AggregateChanges,
    #[serde(skip)]
    commits: usize,
    pub pings: u32,
}

impl Spy {
    pub fn commits(&self) -> usize {
        self.commits
    }
}

#[domain_event]
pub enum SpyEvent {
    Pinged,
}

impl Entity for Spy {
    fn new(id: Uuid, version: usize) -> Self {
        Self {
            id,
            version,
            ..Default::default()
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> usize {
        self.version
    }
}

impl ClassIdEntity for Spy {
    fn class_id(&self) -> Option<ClassId> {
        self.class_id
    }

    fn set_class_id(&mut self, class_id: ClassId) {
        self.class_id = Some(class_id);
    }
}

impl AggregateRoot for Spy {
    fn changes(&self) -> &AggregateChanges {
        &self.changes
    }

    fn changes_mut(&mut self) -> &mut AggregateChanges {
        &mut self.changes
    }

    fn set_version(&mut self, version: usize) {
        self.version = version;
    }

    fn commit(&mut self) {
        self.commits += 1;
        self.changes.clear();
    }
}

impl PersistentEntity for Spy {
    const TABLE: &'static str = "spies";

    fn as_class_id_entity(&self) -> Option<&dyn ClassIdEntity> {
        Some(self)
    }

    fn as_class_id_entity_mut(&mut self) -> Option<&mut dyn ClassIdEntity> {
        Some(self)
    }

    fn as_aggregate_root(&self) -> Option<&dyn AggregateRoot> {
        Some(self)
    }

    fn as_aggregate_root_mut(&mut self) -> Option<&mut dyn AggregateRoot> {
        Some(self)
    }
}

impl Aggregate for Spy {
    type Event = SpyEvent;

    fn apply(&mut self, _event: &Self::Event) {
        self.pings += 1;
    }
}

// -------- 对账回调 --------

#[derive(Default)]
pub struct RecordingHook {
    calls: Mutex<Vec<(ReconciliationReport, String)>>,
}

impl RecordingHook {
    pub fn calls(&self) -> Vec<(ReconciliationReport, String)> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ReconciliationHook for RecordingHook {
    fn on_unpublished_events(&self, report: &ReconciliationReport, error: &DomainError) {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((report.clone(), error.to_string()));
    }
}

// -------- 测试环境 --------

pub struct Harness {
    pub database: InMemoryDatabase,
    pub registry: Arc<EntityTypeRegistry>,
    pub order_class_id: ClassId,
    pub spy_class_id: ClassId,
}

impl Harness {
    pub fn new() -> Self {
        let order_class_id = ClassId::new(Uuid::new_v4()).unwrap();
        let spy_class_id = ClassId::new(Uuid::new_v4()).unwrap();
        let registry = EntityTypeRegistry::builder()
            .register::<Order>(order_class_id)
            .and_then(|b| b.register::<Spy>(spy_class_id))
            .unwrap()
            .build();
        let database = InMemoryDatabase::builder()
            .map::<Order>()
            .and_then(|b| b.map::<Note>())
            .and_then(|b| b.map::<Spy>())
            .unwrap()
            .build();

        Self {
            database,
            registry: Arc::new(registry),
            order_class_id,
            spy_class_id,
        }
    }

    /// 新会话：独立的仓储与缓冲区
    pub fn session(&self) -> (Store, Arc<InMemoryPublishEventBuffer>) {
        let buffer = Arc::new(InMemoryPublishEventBuffer::new());
        let store = CrudAggregateStore::new(
            InMemoryCrudRepository::new(self.database.clone()),
            self.registry.clone(),
            Arc::new(DefaultEventMessageFactory::new()),
            buffer.clone(),
        );
        (store, buffer)
    }

    pub fn session_with_hook(
        &self,
        hook: Arc<RecordingHook>,
    ) -> (Store, Arc<InMemoryPublishEventBuffer>) {
        let (store, buffer) = self.session();
        (store.with_reconciliation_hook(hook), buffer)
    }

    /// 在独立会话中保存一组订单
    pub fn seed_orders(&self, orders: Vec<Order>) {
        use eskit_infra::AggregateStore;

        let (mut store, _) = self.session();
        for order in orders {
            store.add(order).unwrap();
        }
        store.save_changes().unwrap();
    }
}
