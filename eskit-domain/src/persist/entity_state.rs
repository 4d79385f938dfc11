use std::fmt;

/// 跟踪会话中实体的变更状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// 新增，尚未写入存储
    Added,
    /// 已持久化且与加载时的快照不同
    Modified,
    /// 标记为删除，下次保存时删除
    Removed,
    /// 已持久化且未修改
    Unchanged,
}

impl EntityState {
    pub const ALL: [EntityState; 4] = [
        EntityState::Added,
        EntityState::Modified,
        EntityState::Removed,
        EntityState::Unchanged,
    ];

    /// 保存时需要写入存储
    pub fn is_pending(&self) -> bool {
        !matches!(self, EntityState::Unchanged)
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityState::Added => "added",
            EntityState::Modified => "modified",
            EntityState::Removed => "removed",
            EntityState::Unchanged => "unchanged",
        };
        f.write_str(s)
    }
}
