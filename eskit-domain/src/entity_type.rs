//! 实体类型注册表（Entity Type Registry）
//!
//! 将运行时类型标识（`TypeId`）映射为稳定的类标识（`ClassId`）。
//! 注册表在启动时通过构建器显式填充，构建后不可变，可通过 `Arc` 共享。
//!
use crate::class_id::ClassId;
use crate::error::{DomainError, DomainResult};
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 以运行时类型标识为键的类型键（附带类型名，仅用于诊断）
#[derive(Clone, Copy)]
pub struct EntityTypeKey {
    id: TypeId,
    name: &'static str,
}

impl EntityTypeKey {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EntityTypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityTypeKey {}

impl Hash for EntityTypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EntityTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for EntityTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 类型与类标识之间的双向解析
pub trait EntityTypeManager: Send + Sync {
    /// 非失败查找：未注册的类型返回 `None`（用于尽力而为的元数据标记）
    fn try_get_class_id_by_type(&self, key: EntityTypeKey) -> Option<ClassId>;

    /// 反向查找：由类标识解析实体类型
    fn try_get_type_by_class_id(&self, class_id: ClassId) -> Option<EntityTypeKey>;

    /// 必需查找：未注册的类型视为配置缺陷，返回 `UnknownType`
    fn get_class_id_by_type(&self, key: EntityTypeKey) -> DomainResult<ClassId> {
        self.try_get_class_id_by_type(key)
            .ok_or_else(|| DomainError::UnknownType {
                type_name: key.name().to_string(),
            })
    }
}

/// 启动时填充的实体类型注册表
#[derive(Debug, Default)]
pub struct EntityTypeRegistry {
    by_type: HashMap<EntityTypeKey, ClassId>,
    by_class_id: HashMap<ClassId, EntityTypeKey>,
}

impl EntityTypeRegistry {
    pub fn builder() -> EntityTypeRegistryBuilder {
        EntityTypeRegistryBuilder::default()
    }

    /// 类型化便捷查找
    pub fn class_id_of<T: 'static>(&self) -> Option<ClassId> {
        self.try_get_class_id_by_type(EntityTypeKey::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl EntityTypeManager for EntityTypeRegistry {
    fn try_get_class_id_by_type(&self, key: EntityTypeKey) -> Option<ClassId> {
        self.by_type.get(&key).copied()
    }

    fn try_get_type_by_class_id(&self, class_id: ClassId) -> Option<EntityTypeKey> {
        self.by_class_id.get(&class_id).copied()
    }
}

/// 注册表构建器：类型与类标识必须一一对应
#[derive(Debug, Default)]
pub struct EntityTypeRegistryBuilder {
    registry: EntityTypeRegistry,
}

impl EntityTypeRegistryBuilder {
    pub fn register<T: 'static>(mut self, class_id: ClassId) -> DomainResult<Self> {
        let key = EntityTypeKey::of::<T>();

        if let Some(existing) = self.registry.by_type.get(&key) {
            return Err(DomainError::InvalidValue {
                reason: format!("type {key} already registered with class id {existing}"),
            });
        }

        if let Some(owner) = self.registry.by_class_id.get(&class_id) {
            return Err(DomainError::InvalidValue {
                reason: format!("class id {class_id} already registered for {owner}"),
            });
        }

        self.registry.by_type.insert(key, class_id);
        self.registry.by_class_id.insert(class_id, key);

        Ok(self)
    }

    pub fn build(self) -> EntityTypeRegistry {
        self.registry
    }
}
