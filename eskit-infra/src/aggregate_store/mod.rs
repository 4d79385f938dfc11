//! 聚合存储（Aggregate Store）
//!
//! 面向聚合的查询与变更接口，以及原子化的保存协议：
//! 1. 标记：为新增/修改的实体补写类标识；
//! 2. 持久化：委托给 CRUD 仓储一次性写入；
//! 3. 提交：把已变更聚合的未提交事件转为消息推入发布缓冲区，然后清空。
//!
//! 存储按工作单元创建，不在内部并发或重试。
//!
mod crud;
mod reconciliation;
mod routing;

pub use crud::CrudAggregateStore;
pub use reconciliation::{LoggingReconciliationHook, ReconciliationHook, ReconciliationReport};
pub use routing::RoutingAggregateStore;

use crate::error::StoreResult;
use async_trait::async_trait;
use eskit_domain::aggregate::Aggregate;
use eskit_domain::aggregate_root::AggregateRoot;
use eskit_domain::entity_type::EntityTypeKey;
use eskit_domain::persist::Query;
use eskit_domain::specification::Specification;
use std::ops::Add;
use uuid::Uuid;

/// 一次保存的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    /// 本次补写类标识的实体数
    pub tagged: usize,
    /// 写入存储的行数
    pub written: usize,
    /// 完成提交的聚合数
    pub committed: usize,
    /// 推入缓冲区的消息数
    pub published: usize,
}

impl Add for SaveSummary {
    type Output = SaveSummary;

    fn add(self, rhs: SaveSummary) -> SaveSummary {
        SaveSummary {
            tagged: self.tagged + rhs.tagged,
            written: self.written + rhs.written,
            committed: self.committed + rhs.committed,
            published: self.published + rhs.published,
        }
    }
}

/// 聚合存储接口
///
/// 读取返回的可变引用指向会话持有的实例，修改会在下次保存时写入。
/// 同步与异步版本对同一状态给出相同结果。
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// 纳入跟踪，下次保存时写入
    fn add<T: Aggregate>(&mut self, aggregate: T) -> StoreResult<()>;

    /// 按 id 读取；不存在时返回 `NotFound`
    fn get<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<&mut T>;

    async fn get_async<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<&mut T>;

    fn find<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<Option<&mut T>>;

    async fn find_async<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<Option<&mut T>>;

    fn first_or_default<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<Option<&mut T>>;

    async fn first_or_default_async<T: Aggregate>(
        &mut self,
        query: &Query<T>,
    ) -> StoreResult<Option<&mut T>>;

    /// 查询的第一个结果；没有匹配时返回 `NotFound`
    fn first<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<&mut T>;

    async fn first_async<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<&mut T>;

    /// 该类型全部聚合的查询描述，不立即求值
    fn find_all<T: Aggregate>(&self) -> Query<T> {
        Query::all()
    }

    fn filter<T, S>(&self, spec: S) -> Query<T>
    where
        T: Aggregate,
        S: Specification<T> + 'static,
    {
        Query::filter(spec)
    }

    /// 对查询求值
    fn fetch<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<Vec<&mut T>>;

    async fn fetch_async<T: Aggregate>(&mut self, query: &Query<T>) -> StoreResult<Vec<&mut T>>;

    /// 标记删除，下次保存时生效
    fn remove<T: Aggregate>(&mut self, id: Uuid) -> StoreResult<()>;

    /// 会话持有的全部聚合
    fn tracked_aggregates(&self) -> Vec<&dyn AggregateRoot>;

    fn can_handle_aggregate_type(&self, key: EntityTypeKey) -> bool;

    /// 标记 → 持久化 → 提交
    fn save_changes(&mut self) -> StoreResult<SaveSummary>;

    async fn save_changes_async(&mut self) -> StoreResult<SaveSummary>;
}
