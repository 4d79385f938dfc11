//! 事件消息工厂
//!
//! 将聚合事件转换为消息草稿：解析载荷的 JSON 表示并写入标准元数据。
//! 工厂不产生副作用，也不改变事件顺序；聚合类标识由聚合存储写入，工厂从不写入。
//!
use super::message::EventMessageDraft;
use super::metadata;
use crate::domain_event::{AggregateEvent, EventContext};
use crate::error::{DomainError, DomainResult as Result};
use async_trait::async_trait;
use std::sync::Arc;

/// 同步与异步两条独立路径，语义一致
#[async_trait]
pub trait EventMessageFactory: Send + Sync {
    fn create_message(&self, event: &AggregateEvent) -> Result<EventMessageDraft>;

    async fn create_message_async(&self, event: &AggregateEvent) -> Result<EventMessageDraft>;
}

#[async_trait]
impl<T> EventMessageFactory for Arc<T>
where
    T: EventMessageFactory + ?Sized,
{
    fn create_message(&self, event: &AggregateEvent) -> Result<EventMessageDraft> {
        (**self).create_message(event)
    }

    async fn create_message_async(&self, event: &AggregateEvent) -> Result<EventMessageDraft> {
        (**self).create_message_async(event).await
    }
}

/// 默认工厂：序列化载荷，写入事件/聚合标识、版本、时间与可选的业务上下文
#[derive(Debug, Clone, Default)]
pub struct DefaultEventMessageFactory {
    context: Option<EventContext>,
}

impl DefaultEventMessageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: EventContext) -> Self {
        Self {
            context: Some(context),
        }
    }

    fn build(&self, event: &AggregateEvent) -> Result<EventMessageDraft> {
        let payload =
            event
                .payload()
                .to_json()
                .map_err(|err| DomainError::MessageConstruction {
                    event_id: event.event_id(),
                    reason: err.to_string(),
                })?;

        let mut draft = EventMessageDraft::new(event.clone(), payload);
        draft.set_metadata(metadata::EVENT_ID, event.event_id().to_string());
        draft.set_metadata(metadata::EVENT_TYPE, event.event_type());
        draft.set_metadata(metadata::EVENT_VERSION, event.event_version().to_string());
        draft.set_metadata(metadata::AGGREGATE_ID, event.aggregate_id().to_string());
        draft.set_metadata(
            metadata::AGGREGATE_VERSION,
            event.aggregate_version().to_string(),
        );
        draft.set_metadata(metadata::OCCURRED_AT, event.occurred_at().to_rfc3339());

        if let Some(context) = &self.context {
            let entries = [
                (metadata::CORRELATION_ID, context.correlation_id()),
                (metadata::CAUSATION_ID, context.causation_id()),
                (metadata::ACTOR_TYPE, context.actor_type()),
                (metadata::ACTOR_ID, context.actor_id()),
            ];
            for (key, value) in entries {
                if let Some(value) = value {
                    draft.set_metadata(key, value);
                }
            }
        }

        Ok(draft)
    }
}

#[async_trait]
impl EventMessageFactory for DefaultEventMessageFactory {
    fn create_message(&self, event: &AggregateEvent) -> Result<EventMessageDraft> {
        self.build(event)
    }

    async fn create_message_async(&self, event: &AggregateEvent) -> Result<EventMessageDraft> {
        self.build(event)
    }
}
