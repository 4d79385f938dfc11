use crate::error::DomainResult as Result;
use crate::eventing::{EventBus, PublishEventBuffer};

/// 将缓冲区中的消息按顺序发布到总线，返回发布条数
///
/// 每条消息发布成功后才出队；发布失败时返回错误，失败的消息及其后续消息仍留在缓冲区。
/// 同一缓冲区同一时刻只应有一个冲刷者。
pub async fn flush_buffer<B, E>(buffer: &B, bus: &E) -> Result<usize>
where
    B: PublishEventBuffer + ?Sized,
    E: EventBus + ?Sized,
{
    let mut published = 0;
    while let Some(message) = buffer.peek() {
        bus.publish(&message).await?;
        buffer.pop();
        published += 1;
    }
    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_event::AggregateEvent;
    use crate::error::DomainError;
    use crate::eventing::{
        EventMessage, EventMessageDraft, InMemoryEventBus, InMemoryPublishEventBuffer,
    };
    use async_trait::async_trait;
    use eskit_macros::domain_event;
    use futures_core::stream::BoxStream;
    use futures_util::StreamExt;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[domain_event]
    enum PingEvent {
        Pinged { seq: usize },
    }

    fn fill(buffer: &InMemoryPublishEventBuffer, count: usize) -> Uuid {
        let id = Uuid::new_v4();
        for seq in 1..=count {
            let event = AggregateEvent::new(id, seq, PingEvent::Pinged { seq });
            let payload = event.payload().to_json().unwrap();
            buffer.push_event(EventMessageDraft::new(event, payload));
        }
        id
    }

    /// 第 n 次发布失败的总线
    struct FailingBus {
        fail_at: usize,
        published: Mutex<Vec<EventMessage>>,
    }

    #[async_trait]
    impl EventBus for FailingBus {
        async fn publish(&self, message: &EventMessage) -> Result<()> {
            let mut published = self.published.lock().unwrap();
            if published.len() + 1 == self.fail_at {
                return Err(DomainError::event_bus("broker unavailable"));
            }
            published.push(message.clone());
            Ok(())
        }

        async fn subscribe(&self) -> BoxStream<'static, Result<EventMessage>> {
            futures_util::stream::empty().boxed()
        }
    }

    #[tokio::test]
    async fn publishes_in_order_and_empties_buffer() {
        let buffer = InMemoryPublishEventBuffer::new();
        let bus = InMemoryEventBus::new(16);
        let mut stream = bus.subscribe().await;
        fill(&buffer, 3);

        let published = flush_buffer(&buffer, &bus).await.unwrap();

        assert_eq!(published, 3);
        assert!(buffer.is_empty());
        for expected in 1..=3 {
            let message = stream.next().await.unwrap().unwrap();
            assert_eq!(message.aggregate_version(), expected);
        }
    }

    #[tokio::test]
    async fn failing_publish_keeps_remaining_messages() {
        let buffer = InMemoryPublishEventBuffer::new();
        fill(&buffer, 3);
        let bus = FailingBus {
            fail_at: 2,
            published: Mutex::new(Vec::new()),
        };

        let err = flush_buffer(&buffer, &bus).await.unwrap_err();

        assert!(matches!(err, DomainError::EventBus { .. }));
        assert_eq!(bus.published.lock().unwrap().len(), 1);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.peek().unwrap().aggregate_version(), 2);
    }
}
