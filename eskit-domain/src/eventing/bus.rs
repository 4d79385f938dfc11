//! 事件总线（EventBus）协议
//!
//! 定义事件消息发布与订阅的统一抽象，支持批量发布与 'static 生命周期消息流，
//! 以便在异步运行时（如 tokio::spawn）中消费。
//!
use crate::{error::DomainResult as Result, eventing::EventMessage};
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use std::sync::Arc;

/// 事件总线：负责分发消息与订阅消息流
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, message: &EventMessage) -> Result<()>;

    async fn publish_batch(&self, messages: &[EventMessage]) -> Result<()> {
        for message in messages {
            self.publish(message).await?;
        }
        Ok(())
    }

    /// 返回一个 'static 生命周期的消息流，便于在 tokio::spawn 中使用
    async fn subscribe(&self) -> BoxStream<'static, Result<EventMessage>>;
}

#[async_trait]
impl<T> EventBus for Arc<T>
where
    T: EventBus + ?Sized,
{
    async fn publish(&self, message: &EventMessage) -> Result<()> {
        (**self).publish(message).await
    }

    async fn publish_batch(&self, messages: &[EventMessage]) -> Result<()> {
        (**self).publish_batch(messages).await
    }

    async fn subscribe(&self) -> BoxStream<'static, Result<EventMessage>> {
        (**self).subscribe().await
    }
}
