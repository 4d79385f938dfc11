//! 聚合根（AggregateRoot）
//!
//! 对象安全的聚合根视图：聚合存储通过它读取变更标记与未提交事件，
//! 并在事件转为消息后调用 `commit` 清空。
//!
use crate::domain_event::AggregateEvent;
use crate::entity::Entity;

/// 聚合自上次提交以来的领域级变更
///
/// `changed` 反映领域变更而非存储脏状态：记录事件会置位，
/// 没有事件的变更也可通过 `mark_changed` 显式置位。
#[derive(Debug, Clone, Default)]
pub struct AggregateChanges {
    events: Vec<AggregateEvent>,
    changed: bool,
}

impl AggregateChanges {
    pub fn record(&mut self, event: AggregateEvent) {
        self.events.push(event);
        self.changed = true;
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn events(&self) -> &[AggregateEvent] {
        &self.events
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.changed = false;
    }
}

/// 聚合根接口（对象安全）
pub trait AggregateRoot: Entity {
    fn changes(&self) -> &AggregateChanges;

    fn changes_mut(&mut self) -> &mut AggregateChanges;

    /// 由事件推进版本号
    fn set_version(&mut self, version: usize);

    fn is_changed(&self) -> bool {
        self.changes().is_changed()
    }

    fn uncommitted_events(&self) -> &[AggregateEvent] {
        self.changes().events()
    }

    /// 清空未提交事件并复位变更标记
    fn commit(&mut self) {
        self.changes_mut().clear();
    }
}
