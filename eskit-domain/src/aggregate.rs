//! 聚合（Aggregate）抽象
//!
//! 类型化的聚合接口：
//! - `apply` 将事件投影到状态（改变状态）；
//! - `raise` 应用事件、推进版本并记录为未提交事件；
//! - 通过 `PersistentEntity` 约束聚合可被 CRUD 仓储持久化。
//!
use crate::aggregate_root::AggregateRoot;
use crate::domain_event::{AggregateEvent, DomainEvent};
use crate::persist::PersistentEntity;

/// 类型化聚合接口
pub trait Aggregate: AggregateRoot + PersistentEntity + Default + Clone {
    /// 该聚合产生的领域事件类型
    type Event: DomainEvent;

    /// 应用事件，更新聚合状态
    fn apply(&mut self, event: &Self::Event);

    /// 触发事件：应用到状态、推进版本并追加到未提交事件
    fn raise(&mut self, event: Self::Event) {
        let version = self.version() + 1;
        self.apply(&event);
        self.set_version(version);

        let recorded = AggregateEvent::new(self.id(), version, event);
        self.changes_mut().record(recorded);
    }
}
