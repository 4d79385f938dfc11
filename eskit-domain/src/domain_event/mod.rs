//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`）、类型擦除后的载荷视图
//! （`EventPayload`），以及聚合记录未提交事件所用的 `AggregateEvent`。

mod aggregate_event;
mod domain_event_trait;
mod event_context;
mod event_payload;

pub use aggregate_event::AggregateEvent;
pub use domain_event_trait::DomainEvent;
pub use event_context::EventContext;
pub use event_payload::EventPayload;
