//! 事件子系统（eventing）
//!
//! 聚合事件从产生到对外发布的路径：
//! - `EventMessageDraft`/`EventMessage`：由单个聚合事件构造的消息草稿与定稿消息；
//! - `EventMessageFactory`：将聚合事件转换为草稿并写入标准元数据；
//! - `PublishEventBuffer`：事务提交前暂存定稿消息的进程内队列；
//! - `EventBus`（`eventing` 特性）：发布/订阅接口及内存实现，`flush_buffer` 将缓冲区冲刷到总线。
//!
//! 投递时机与传输方式不属于聚合存储，由缓冲区的持有者决定。
//!
mod buffer;
mod factory;
mod message;
pub mod metadata;

#[cfg(feature = "eventing")]
pub mod bus;
#[cfg(feature = "eventing")]
mod bus_inmemory;
#[cfg(feature = "eventing")]
mod flush;

pub use buffer::{InMemoryPublishEventBuffer, PublishEventBuffer};
pub use factory::{DefaultEventMessageFactory, EventMessageFactory};
pub use message::{EventMessage, EventMessageDraft};

#[cfg(feature = "eventing")]
pub use bus::EventBus;
#[cfg(feature = "eventing")]
pub use bus_inmemory::InMemoryEventBus;
#[cfg(feature = "eventing")]
pub use flush::flush_buffer;
