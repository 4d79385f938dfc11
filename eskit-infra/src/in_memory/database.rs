//! 共享内存数据库
//!
//! 以表为单位保存实体行（JSON），供多个会话共享。实体类型必须在启动时映射，
//! 写入在单个写锁内校验后整体生效：任一行冲突则整批不写。
//!
use crate::naming::{NamingConvention, NamingStyle};
use eskit_domain::entity_type::EntityTypeKey;
use eskit_domain::error::{DomainError, DomainResult as Result};
use eskit_domain::persist::PersistentEntity;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// 存储行；`revision` 由数据库在每次写入时递增，与实体自身的版本号无关
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: Uuid,
    pub revision: usize,
    pub data: Value,
}

/// 一次保存中的单行变更
///
/// 更新与删除携带会话加载时看到的修订号，不一致即视为并发冲突。
#[derive(Debug, Clone)]
pub enum RowChange {
    Insert {
        key: EntityTypeKey,
        id: Uuid,
        data: Value,
    },
    Update {
        key: EntityTypeKey,
        id: Uuid,
        expected_revision: usize,
        data: Value,
    },
    Delete {
        key: EntityTypeKey,
        id: Uuid,
        expected_revision: usize,
    },
}

/// 新插入行的修订号
pub const INITIAL_REVISION: usize = 1;

impl RowChange {
    fn key(&self) -> EntityTypeKey {
        match self {
            RowChange::Insert { key, .. }
            | RowChange::Update { key, .. }
            | RowChange::Delete { key, .. } => *key,
        }
    }
}

type Table = BTreeMap<Uuid, StoredRow>;

#[derive(Debug)]
struct Inner {
    tables_by_type: HashMap<EntityTypeKey, String>,
    tables: RwLock<HashMap<String, Table>>,
}

/// 可克隆的共享句柄
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    inner: Arc<Inner>,
}

impl InMemoryDatabase {
    pub fn builder() -> InMemoryDatabaseBuilder {
        InMemoryDatabaseBuilder::new(NamingStyle::default().convention())
    }

    pub fn is_type_mapped(&self, key: EntityTypeKey) -> bool {
        self.inner.tables_by_type.contains_key(&key)
    }

    /// 类型映射到的物理表名
    pub fn table_name(&self, key: EntityTypeKey) -> Option<&str> {
        self.inner.tables_by_type.get(&key).map(String::as_str)
    }

    pub fn load(&self, key: EntityTypeKey, id: Uuid) -> Result<Option<StoredRow>> {
        let table = self.resolve(key)?;
        Ok(self
            .read()
            .get(table)
            .and_then(|rows| rows.get(&id))
            .cloned())
    }

    /// 按 id 顺序返回该类型的全部行
    pub fn scan(&self, key: EntityTypeKey) -> Result<Vec<StoredRow>> {
        let table = self.resolve(key)?;
        Ok(self
            .read()
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    pub fn row_count(&self, key: EntityTypeKey) -> Result<usize> {
        let table = self.resolve(key)?;
        Ok(self.read().get(table).map(BTreeMap::len).unwrap_or(0))
    }

    /// 校验并写入一批变更，返回写入行数
    ///
    /// 先在写锁内校验全部变更，全部通过后才落盘。
    pub fn apply(&self, changes: Vec<RowChange>) -> Result<usize> {
        let mut tables = self.write();

        let mut inserted = HashSet::new();
        for change in &changes {
            let table = self.resolve(change.key())?;
            let rows = tables.get(table);
            match change {
                RowChange::Insert { id, .. } => {
                    let exists = rows.is_some_and(|rows| rows.contains_key(id));
                    if exists || !inserted.insert((table, *id)) {
                        return Err(DomainError::persistence(format!(
                            "duplicate key {id} in table {table}"
                        )));
                    }
                }
                RowChange::Update {
                    id,
                    expected_revision,
                    ..
                }
                | RowChange::Delete {
                    id,
                    expected_revision,
                    ..
                } => check_revision(table, rows, *id, *expected_revision)?,
            }
        }

        let written = changes.len();
        for change in changes {
            let table = self.resolve(change.key())?.to_string();
            let rows = tables.entry(table).or_default();
            match change {
                RowChange::Insert { id, data, .. } => {
                    rows.insert(
                        id,
                        StoredRow {
                            id,
                            revision: INITIAL_REVISION,
                            data,
                        },
                    );
                }
                RowChange::Update {
                    id,
                    expected_revision,
                    data,
                    ..
                } => {
                    rows.insert(
                        id,
                        StoredRow {
                            id,
                            revision: expected_revision + 1,
                            data,
                        },
                    );
                }
                RowChange::Delete { id, .. } => {
                    rows.remove(&id);
                }
            }
        }

        Ok(written)
    }

    fn resolve(&self, key: EntityTypeKey) -> Result<&str> {
        self.table_name(key)
            .ok_or_else(|| DomainError::UnknownType {
                type_name: key.name().to_string(),
            })
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Table>> {
        self.inner
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Table>> {
        self.inner
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_revision(table: &str, rows: Option<&Table>, id: Uuid, expected: usize) -> Result<()> {
    match rows.and_then(|rows| rows.get(&id)) {
        None => Err(DomainError::persistence(format!(
            "row {id} no longer exists in table {table}"
        ))),
        Some(stored) if stored.revision != expected => Err(DomainError::VersionConflict {
            entity: format!("{table}/{id}"),
            expected,
            actual: stored.revision,
        }),
        Some(_) => Ok(()),
    }
}

/// 启动时映射实体类型
#[derive(Debug)]
pub struct InMemoryDatabaseBuilder {
    naming: Arc<dyn NamingConvention>,
    tables_by_type: HashMap<EntityTypeKey, String>,
}

impl InMemoryDatabaseBuilder {
    fn new(naming: Arc<dyn NamingConvention>) -> Self {
        Self {
            naming,
            tables_by_type: HashMap::new(),
        }
    }

    /// 替换命名约定；只影响之后映射的类型
    pub fn naming(mut self, naming: Arc<dyn NamingConvention>) -> Self {
        self.naming = naming;
        self
    }

    pub fn naming_style(self, style: NamingStyle) -> Self {
        self.naming(style.convention())
    }

    /// 映射实体类型；两个类型不能映射到同一张表
    pub fn map<T: PersistentEntity>(mut self) -> Result<Self> {
        let key = EntityTypeKey::of::<T>();
        let table = self.naming.table_name(T::TABLE);

        if let Some((owner, _)) = self.tables_by_type.iter().find(|(_, t)| **t == table) {
            return Err(DomainError::InvalidValue {
                reason: format!("table {table} is already mapped to {owner}"),
            });
        }

        self.tables_by_type.insert(key, table);
        Ok(self)
    }

    pub fn build(self) -> InMemoryDatabase {
        let tables = self
            .tables_by_type
            .values()
            .map(|table| (table.clone(), Table::new()))
            .collect();
        InMemoryDatabase {
            inner: Arc::new(Inner {
                tables_by_type: self.tables_by_type,
                tables: RwLock::new(tables),
            }),
        }
    }
}
