//! CRUD 仓储协议
//!
//! 带变更跟踪的通用实体仓储：读取操作会把实体纳入跟踪会话，
//! 返回的可变引用指向会话持有的实例；`save_changes` 将会话中的
//! 新增/修改/删除一次性写入存储。同步与异步版本语义一致。
//!
use crate::entity_type::EntityTypeKey;
use crate::error::{DomainError, DomainResult as Result};
use crate::persist::{EntityState, PersistentEntity, Query, TrackedEntity};
use async_trait::async_trait;
use std::any::type_name;
use uuid::Uuid;

#[async_trait]
pub trait CrudRepository: Send + Sync {
    /// 以“新增”状态纳入跟踪，不立即写入
    fn add<T: PersistentEntity>(&mut self, entity: T) -> Result<()>;

    /// 标记删除，下次保存时生效；实体不存在时返回 `NotFound`
    fn remove<T: PersistentEntity>(&mut self, id: Uuid) -> Result<()>;

    fn find<T: PersistentEntity>(&mut self, id: Uuid) -> Result<Option<&mut T>>;

    async fn find_async<T: PersistentEntity>(&mut self, id: Uuid) -> Result<Option<&mut T>>;

    fn get<T: PersistentEntity>(&mut self, id: Uuid) -> Result<&mut T> {
        match self.find::<T>(id)? {
            Some(entity) => Ok(entity),
            None => Err(not_found::<T>(id)),
        }
    }

    async fn get_async<T: PersistentEntity>(&mut self, id: Uuid) -> Result<&mut T> {
        match self.find_async::<T>(id).await? {
            Some(entity) => Ok(entity),
            None => Err(not_found::<T>(id)),
        }
    }

    /// 对查询求值，返回全部匹配实体
    fn fetch<T: PersistentEntity>(&mut self, query: &Query<T>) -> Result<Vec<&mut T>>;

    async fn fetch_async<T: PersistentEntity>(
        &mut self,
        query: &Query<T>,
    ) -> Result<Vec<&mut T>>;

    fn first_or_default<T: PersistentEntity>(
        &mut self,
        query: &Query<T>,
    ) -> Result<Option<&mut T>> {
        Ok(self.fetch(query)?.into_iter().next())
    }

    async fn first_or_default_async<T: PersistentEntity>(
        &mut self,
        query: &Query<T>,
    ) -> Result<Option<&mut T>> {
        Ok(self.fetch_async(query).await?.into_iter().next())
    }

    fn first<T: PersistentEntity>(&mut self, query: &Query<T>) -> Result<&mut T> {
        match self.first_or_default(query)? {
            Some(entity) => Ok(entity),
            None => Err(no_match::<T>()),
        }
    }

    async fn first_async<T: PersistentEntity>(&mut self, query: &Query<T>) -> Result<&mut T> {
        match self.first_or_default_async(query).await? {
            Some(entity) => Ok(entity),
            None => Err(no_match::<T>()),
        }
    }

    /// 会话中处于给定状态之一的实体
    fn entities(&self, states: &[EntityState]) -> Result<Vec<&dyn TrackedEntity>>;

    fn entities_mut(&mut self, states: &[EntityState]) -> Result<Vec<&mut dyn TrackedEntity>>;

    /// 会话持有的全部实体（含已删除、已从存储分离的实体），按纳入跟踪的顺序
    fn tracked_entities(&self) -> Vec<&dyn TrackedEntity>;

    fn tracked_entities_mut(&mut self) -> Vec<&mut dyn TrackedEntity>;

    /// 该类型是否映射到存储模型
    fn is_type_mapped(&self, key: EntityTypeKey) -> bool;

    /// 写入全部挂起变更，返回写入的行数
    fn save_changes(&mut self) -> Result<usize>;

    async fn save_changes_async(&mut self) -> Result<usize>;
}

fn not_found<T>(id: Uuid) -> DomainError {
    DomainError::not_found(format!("{} with id {id}", type_name::<T>()))
}

fn no_match<T>() -> DomainError {
    DomainError::not_found(format!("no {} matches the query", type_name::<T>()))
}
