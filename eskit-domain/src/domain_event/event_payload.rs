use super::DomainEvent;
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// 类型擦除后的事件载荷
///
/// 聚合存储需要统一处理不同聚合的事件，因此以对象安全的形式暴露
/// 事件类型、版本与 JSON 表示；具体类型可通过 `as_any` 还原。
pub trait EventPayload: fmt::Debug + Send + Sync {
    fn event_type(&self) -> &str;

    fn event_version(&self) -> usize;

    fn to_json(&self) -> serde_json::Result<Value>;

    fn as_any(&self) -> &dyn Any;
}

impl<E> EventPayload for E
where
    E: DomainEvent,
{
    fn event_type(&self) -> &str {
        DomainEvent::event_type(self)
    }

    fn event_version(&self) -> usize {
        DomainEvent::event_version(self)
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
