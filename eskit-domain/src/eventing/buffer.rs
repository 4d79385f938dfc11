//! 发布事件缓冲区
//!
//! 在事务提交之前暂存定稿消息的进程内队列：保留全部已推入的消息并保持推入顺序，
//! 直到持有者取走。推入只做内存入队，不涉及 I/O。
//!
use super::message::{EventMessage, EventMessageDraft};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait PublishEventBuffer: Send + Sync {
    /// 定稿并入队
    fn push_event(&self, draft: EventMessageDraft);

    /// 当前队列内容的快照（按推入顺序）
    fn events(&self) -> Vec<EventMessage>;

    /// 取走全部消息
    fn drain(&self) -> Vec<EventMessage>;

    fn peek(&self) -> Option<EventMessage>;

    fn pop(&self) -> Option<EventMessage>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> PublishEventBuffer for Arc<T>
where
    T: PublishEventBuffer + ?Sized,
{
    fn push_event(&self, draft: EventMessageDraft) {
        (**self).push_event(draft)
    }

    fn events(&self) -> Vec<EventMessage> {
        (**self).events()
    }

    fn drain(&self) -> Vec<EventMessage> {
        (**self).drain()
    }

    fn peek(&self) -> Option<EventMessage> {
        (**self).peek()
    }

    fn pop(&self) -> Option<EventMessage> {
        (**self).pop()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// 内存缓冲区：互斥锁保护的队列，可在多个会话之间共享
#[derive(Debug, Default)]
pub struct InMemoryPublishEventBuffer {
    queue: Mutex<VecDeque<EventMessage>>,
}

impl InMemoryPublishEventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<EventMessage>> {
        // 队列操作不会留下半完成状态，锁中毒后继续使用
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PublishEventBuffer for InMemoryPublishEventBuffer {
    fn push_event(&self, draft: EventMessageDraft) {
        self.queue().push_back(draft.into_message());
    }

    fn events(&self) -> Vec<EventMessage> {
        self.queue().iter().cloned().collect()
    }

    fn drain(&self) -> Vec<EventMessage> {
        self.queue().drain(..).collect()
    }

    fn peek(&self) -> Option<EventMessage> {
        self.queue().front().cloned()
    }

    fn pop(&self) -> Option<EventMessage> {
        self.queue().pop_front()
    }

    fn len(&self) -> usize {
        self.queue().len()
    }
}
