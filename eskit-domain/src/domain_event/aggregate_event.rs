use super::{DomainEvent, EventPayload};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// 聚合产生的未提交事件
///
/// 在事件载荷之外记录事件标识、所属聚合、聚合版本（事件在聚合内的序号）
/// 与发生时间。载荷以 `Arc` 共享，克隆开销与事件大小无关。
#[derive(Debug, Clone)]
pub struct AggregateEvent {
    event_id: Uuid,
    aggregate_id: Uuid,
    aggregate_version: usize,
    occurred_at: DateTime<Utc>,
    payload: Arc<dyn EventPayload>,
}

impl AggregateEvent {
    pub fn new<E>(aggregate_id: Uuid, aggregate_version: usize, payload: E) -> Self
    where
        E: DomainEvent,
    {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id,
            aggregate_version,
            occurred_at: Utc::now(),
            payload: Arc::new(payload),
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_id(&self) -> Uuid {
        self.aggregate_id
    }

    pub fn aggregate_version(&self) -> usize {
        self.aggregate_version
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn event_type(&self) -> &str {
        self.payload.event_type()
    }

    pub fn event_version(&self) -> usize {
        self.payload.event_version()
    }

    pub fn payload(&self) -> &dyn EventPayload {
        self.payload.as_ref()
    }

    /// 还原为具体事件类型；类型不符时返回 `None`
    pub fn payload_as<E>(&self) -> Option<&E>
    where
        E: DomainEvent,
    {
        self.payload.as_any().downcast_ref::<E>()
    }
}
