//! 带变更跟踪的内存 CRUD 仓储
//!
//! 每个会话持有一份身份映射：同一实体在会话内只有一个实例，读取操作
//! 返回的可变引用都指向它。实体状态由加载时的快照比对得出；保存时
//! 生成行变更交给 [`InMemoryDatabase`] 一次性写入。
//!
use super::database::{INITIAL_REVISION, InMemoryDatabase, RowChange, StoredRow};
use async_trait::async_trait;
use eskit_domain::entity_type::EntityTypeKey;
use eskit_domain::error::{DomainError, DomainResult as Result};
use eskit_domain::persist::{CrudRepository, EntityState, PersistentEntity, Query, TrackedEntity};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 新增，尚未写入
    Added,
    /// 与存储同步过，是否修改由快照比对决定
    Persisted,
    /// 等待删除
    Removed,
    /// 已从存储删除，仍由会话持有
    Detached,
}

struct Entry {
    entity: Box<dyn TrackedEntity>,
    status: Status,
    snapshot: Option<Value>,
    revision: usize,
}

impl Entry {
    fn loaded(entity: Box<dyn TrackedEntity>, row: StoredRow) -> Self {
        Self {
            entity,
            status: Status::Persisted,
            snapshot: Some(row.data),
            revision: row.revision,
        }
    }

    fn is(&self, key: EntityTypeKey, id: Uuid) -> bool {
        self.entity.entity_type() == key && self.entity.entity_id() == id
    }

    fn tracked(&self) -> &dyn TrackedEntity {
        self.entity.as_ref()
    }

    fn tracked_mut(&mut self) -> &mut dyn TrackedEntity {
        self.entity.as_mut()
    }

    /// 对查询可见（未删除）
    fn is_visible(&self) -> bool {
        matches!(self.status, Status::Added | Status::Persisted)
    }

    fn state(&self) -> Result<Option<EntityState>> {
        let state = match self.status {
            Status::Added => EntityState::Added,
            Status::Removed => EntityState::Removed,
            Status::Detached => return Ok(None),
            Status::Persisted => {
                let row = self.entity.to_row()?;
                if self.snapshot.as_ref() == Some(&row) {
                    EntityState::Unchanged
                } else {
                    EntityState::Modified
                }
            }
        };
        Ok(Some(state))
    }
}

/// 单个会话的内存 CRUD 仓储
pub struct InMemoryCrudRepository {
    database: InMemoryDatabase,
    entries: Vec<Entry>,
}

impl InMemoryCrudRepository {
    pub fn new(database: InMemoryDatabase) -> Self {
        Self {
            database,
            entries: Vec::new(),
        }
    }

    pub fn database(&self) -> &InMemoryDatabase {
        &self.database
    }

    /// 会话当前持有的实体数（含已分离的实体）
    pub fn tracked_count(&self) -> usize {
        self.entries.len()
    }

    fn ensure_mapped<T: PersistentEntity>(&self) -> Result<EntityTypeKey> {
        let key = EntityTypeKey::of::<T>();
        if self.database.is_type_mapped(key) {
            Ok(key)
        } else {
            Err(DomainError::UnknownType {
                type_name: key.name().to_string(),
            })
        }
    }

    fn position(&self, key: EntityTypeKey, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|entry| entry.is(key, id))
    }

    fn downcast<T: PersistentEntity>(entry: &mut Entry) -> Result<&mut T> {
        let found = entry.entity.entity_type().name();
        entry
            .entity
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| DomainError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                found: found.to_string(),
            })
    }

    fn attach<T: PersistentEntity>(row: StoredRow) -> Result<Entry> {
        let entity: T = serde_json::from_value(row.data.clone())?;
        Ok(Entry::loaded(Box::new(entity), row))
    }

    fn find_tracked<T: PersistentEntity>(&mut self, id: Uuid) -> Result<Option<&mut T>> {
        let key = self.ensure_mapped::<T>()?;
        let index = match self.position(key, id) {
            Some(index) => index,
            None => match self.database.load(key, id)? {
                Some(row) => {
                    self.entries.push(Self::attach::<T>(row)?);
                    self.entries.len() - 1
                }
                None => return Ok(None),
            },
        };

        let entry = &mut self.entries[index];
        if !entry.is_visible() {
            return Ok(None);
        }
        Self::downcast::<T>(entry).map(Some)
    }

    fn fetch_tracked<T: PersistentEntity>(&mut self, query: &Query<T>) -> Result<Vec<&mut T>> {
        let key = self.ensure_mapped::<T>()?;

        // 先把存储中尚未跟踪的行纳入会话，会话内的实例优先于存储
        for row in self.database.scan(key)? {
            if self.position(key, row.id).is_none() {
                self.entries.push(Self::attach::<T>(row)?);
            }
        }

        let mut matches: Vec<&mut T> = self
            .entries
            .iter_mut()
            .filter(|entry| entry.is_visible() && entry.entity.entity_type() == key)
            .filter_map(|entry| entry.entity.as_any_mut().downcast_mut::<T>())
            .filter(|entity| query.matches(entity))
            .collect();
        matches.sort_by_key(|entity| entity.id());
        Ok(matches)
    }

    fn flush(&mut self) -> Result<usize> {
        let mut changes = Vec::new();
        let mut flushed = Vec::new();

        for (index, entry) in self.entries.iter().enumerate() {
            let key = entry.entity.entity_type();
            let id = entry.entity.entity_id();
            let change = match entry.state()? {
                Some(EntityState::Added) => RowChange::Insert {
                    key,
                    id,
                    data: entry.entity.to_row()?,
                },
                Some(EntityState::Modified) => RowChange::Update {
                    key,
                    id,
                    expected_revision: entry.revision,
                    data: entry.entity.to_row()?,
                },
                Some(EntityState::Removed) => RowChange::Delete {
                    key,
                    id,
                    expected_revision: entry.revision,
                },
                Some(EntityState::Unchanged) | None => continue,
            };
            changes.push(change);
            flushed.push(index);
        }

        if changes.is_empty() {
            tracing::debug!("no pending changes to flush");
            return Ok(0);
        }

        let mut inserted = 0usize;
        let mut updated = 0usize;
        let mut deleted = 0usize;
        for change in &changes {
            match change {
                RowChange::Insert { .. } => inserted += 1,
                RowChange::Update { .. } => updated += 1,
                RowChange::Delete { .. } => deleted += 1,
            }
        }

        let written = self.database.apply(changes)?;

        for index in flushed {
            let entry = &mut self.entries[index];
            match entry.status {
                Status::Added => {
                    entry.snapshot = Some(entry.entity.to_row()?);
                    entry.revision = INITIAL_REVISION;
                    entry.status = Status::Persisted;
                }
                Status::Persisted => {
                    entry.snapshot = Some(entry.entity.to_row()?);
                    entry.revision += 1;
                }
                Status::Removed => {
                    entry.snapshot = None;
                    entry.status = Status::Detached;
                }
                Status::Detached => {}
            }
        }

        tracing::debug!(inserted, updated, deleted, "flushed tracked entities");
        Ok(written)
    }
}

#[async_trait]
impl CrudRepository for InMemoryCrudRepository {
    fn add<T: PersistentEntity>(&mut self, entity: T) -> Result<()> {
        let key = self.ensure_mapped::<T>()?;
        let id = entity.id();

        match self.position(key, id) {
            Some(index) if self.entries[index].status == Status::Detached => {
                self.entries.remove(index);
            }
            Some(_) => {
                return Err(DomainError::InvalidState {
                    reason: format!("{key} with id {id} is already tracked"),
                });
            }
            None => {}
        }

        self.entries.push(Entry {
            entity: Box::new(entity),
            status: Status::Added,
            snapshot: None,
            revision: 0,
        });
        Ok(())
    }

    fn remove<T: PersistentEntity>(&mut self, id: Uuid) -> Result<()> {
        let key = self.ensure_mapped::<T>()?;
        if self.find_tracked::<T>(id)?.is_none() {
            return Err(DomainError::not_found(format!("{key} with id {id}")));
        }

        let Some(index) = self.position(key, id) else {
            return Err(DomainError::not_found(format!("{key} with id {id}")));
        };
        if self.entries[index].status == Status::Added {
            self.entries.remove(index);
        } else {
            self.entries[index].status = Status::Removed;
        }
        Ok(())
    }

    fn find<T: PersistentEntity>(&mut self, id: Uuid) -> Result<Option<&mut T>> {
        self.find_tracked(id)
    }

    async fn find_async<T: PersistentEntity>(&mut self, id: Uuid) -> Result<Option<&mut T>> {
        tokio::task::yield_now().await;
        self.find_tracked(id)
    }

    fn fetch<T: PersistentEntity>(&mut self, query: &Query<T>) -> Result<Vec<&mut T>> {
        self.fetch_tracked(query)
    }

    async fn fetch_async<T: PersistentEntity>(
        &mut self,
        query: &Query<T>,
    ) -> Result<Vec<&mut T>> {
        tokio::task::yield_now().await;
        self.fetch_tracked(query)
    }

    fn entities(&self, states: &[EntityState]) -> Result<Vec<&dyn TrackedEntity>> {
        let mut selected = Vec::new();
        for entry in &self.entries {
            if entry.state()?.is_some_and(|state| states.contains(&state)) {
                selected.push(entry.tracked());
            }
        }
        Ok(selected)
    }

    fn entities_mut(&mut self, states: &[EntityState]) -> Result<Vec<&mut dyn TrackedEntity>> {
        let mut keep = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            keep.push(entry.state()?.is_some_and(|state| states.contains(&state)));
        }

        Ok(self
            .entries
            .iter_mut()
            .zip(keep)
            .filter(|(_, keep)| *keep)
            .map(|(entry, _)| entry.tracked_mut())
            .collect())
    }

    fn tracked_entities(&self) -> Vec<&dyn TrackedEntity> {
        self.entries.iter().map(Entry::tracked).collect()
    }

    fn tracked_entities_mut(&mut self) -> Vec<&mut dyn TrackedEntity> {
        self.entries.iter_mut().map(Entry::tracked_mut).collect()
    }

    fn is_type_mapped(&self, key: EntityTypeKey) -> bool {
        self.database.is_type_mapped(key)
    }

    fn save_changes(&mut self) -> Result<usize> {
        self.flush()
    }

    async fn save_changes_async(&mut self) -> Result<usize> {
        tokio::task::yield_now().await;
        self.flush()
    }
}
