use crate::aggregate_root::AggregateRoot;
use crate::class_id::ClassIdEntity;
use crate::entity::Entity;
use crate::entity_type::EntityTypeKey;
use crate::error::DomainResult;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use uuid::Uuid;

/// 可被 CRUD 仓储持久化的实体
///
/// 能力视图（类标识标记、聚合根）默认不提供，由 `#[entity]`/`#[aggregate]`
/// 宏按需覆盖，替代运行时的类型探测。
pub trait PersistentEntity: Entity + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// 存储表名（命名约定之前的逻辑名）
    const TABLE: &'static str;

    fn as_class_id_entity(&self) -> Option<&dyn ClassIdEntity> {
        None
    }

    fn as_class_id_entity_mut(&mut self) -> Option<&mut dyn ClassIdEntity> {
        None
    }

    fn as_aggregate_root(&self) -> Option<&dyn AggregateRoot> {
        None
    }

    fn as_aggregate_root_mut(&mut self) -> Option<&mut dyn AggregateRoot> {
        None
    }
}

/// 跟踪会话持有的实体（对象安全视图）
///
/// 仓储以 `Box<dyn TrackedEntity>` 统一持有不同类型的实体，
/// 聚合存储通过它完成类标识标记与提交阶段的遍历。
pub trait TrackedEntity: Send + Sync {
    fn entity_id(&self) -> Uuid;

    fn entity_version(&self) -> usize;

    fn entity_type(&self) -> EntityTypeKey;

    fn table(&self) -> &'static str;

    /// 序列化为存储行
    fn to_row(&self) -> DomainResult<Value>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn class_id_entity(&self) -> Option<&dyn ClassIdEntity>;

    fn class_id_entity_mut(&mut self) -> Option<&mut dyn ClassIdEntity>;

    fn aggregate_root(&self) -> Option<&dyn AggregateRoot>;

    fn aggregate_root_mut(&mut self) -> Option<&mut dyn AggregateRoot>;
}

impl<T> TrackedEntity for T
where
    T: PersistentEntity,
{
    fn entity_id(&self) -> Uuid {
        Entity::id(self)
    }

    fn entity_version(&self) -> usize {
        Entity::version(self)
    }

    fn entity_type(&self) -> EntityTypeKey {
        EntityTypeKey::of::<T>()
    }

    fn table(&self) -> &'static str {
        T::TABLE
    }

    fn to_row(&self) -> DomainResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn class_id_entity(&self) -> Option<&dyn ClassIdEntity> {
        self.as_class_id_entity()
    }

    fn class_id_entity_mut(&mut self) -> Option<&mut dyn ClassIdEntity> {
        self.as_class_id_entity_mut()
    }

    fn aggregate_root(&self) -> Option<&dyn AggregateRoot> {
        self.as_aggregate_root()
    }

    fn aggregate_root_mut(&mut self) -> Option<&mut dyn AggregateRoot> {
        self.as_aggregate_root_mut()
    }
}
