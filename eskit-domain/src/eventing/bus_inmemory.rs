//! 内存版事件总线（InMemoryEventBus）
//!
//! 基于 `tokio::sync::broadcast` 的轻量总线，用于测试、示例与本地开发。
//! 没有订阅者时发布的消息被丢弃；订阅者落后超过容量时收到 `EventBus` 错误。

use crate::error::{DomainError, DomainResult as Result};
use crate::eventing::{EventBus, EventMessage};
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

#[derive(Clone)]
pub struct InMemoryEventBus {
    tx: broadcast::Sender<EventMessage>,
}

impl InMemoryEventBus {
    /// `capacity` 为广播缓冲区容量（至少为 1）
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, message: &EventMessage) -> Result<()> {
        // 无订阅者时 send 返回错误，视为非致命
        let _ = self.tx.send(message.clone());
        Ok(())
    }

    async fn subscribe(&self) -> BoxStream<'static, Result<EventMessage>> {
        let rx = self.tx.subscribe();
        let stream =
            BroadcastStream::new(rx).map(|r| r.map_err(|e| DomainError::event_bus(e.to_string())));
        Box::pin(stream)
    }
}
