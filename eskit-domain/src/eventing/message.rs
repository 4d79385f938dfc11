use crate::domain_event::AggregateEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 构造中的事件消息
///
/// 由恰好一个聚合事件构造，元数据在推入发布缓冲区之前可以修改。
#[derive(Debug, Clone)]
pub struct EventMessageDraft {
    event: AggregateEvent,
    payload: Value,
    metadata: BTreeMap<String, String>,
}

impl EventMessageDraft {
    pub fn new(event: AggregateEvent, payload: Value) -> Self {
        Self {
            event,
            payload,
            metadata: BTreeMap::new(),
        }
    }

    pub fn event(&self) -> &AggregateEvent {
        &self.event
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// 写入元数据，同名键被覆盖
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// 定稿：此后消息不可变
    pub fn into_message(self) -> EventMessage {
        EventMessage {
            event_id: self.event.event_id(),
            event_type: self.event.event_type().to_string(),
            event_version: self.event.event_version(),
            aggregate_id: self.event.aggregate_id(),
            aggregate_version: self.event.aggregate_version(),
            occurred_at: self.event.occurred_at(),
            payload: self.payload,
            metadata: self.metadata,
        }
    }
}

/// 已定稿的事件消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    event_id: Uuid,
    event_type: String,
    event_version: usize,
    aggregate_id: Uuid,
    aggregate_version: usize,
    occurred_at: DateTime<Utc>,
    payload: Value,
    metadata: BTreeMap<String, String>,
}

impl EventMessage {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> usize {
        self.event_version
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

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
