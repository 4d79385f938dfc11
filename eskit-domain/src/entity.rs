//! 实体（Entity）基础抽象
//!
//! 为聚合与持久化实体提供统一的标识（UUID）与版本（乐观锁）能力。
//!
use uuid::Uuid;

/// 具备唯一标识与版本的实体抽象
pub trait Entity: Send + Sync {
    /// 使用给定标识与版本创建实体
    fn new(id: Uuid, version: usize) -> Self
    where
        Self: Sized;

    /// 获取实体标识
    fn id(&self) -> Uuid;

    /// 获取当前版本（用于乐观锁与并发控制）
    fn version(&self) -> usize;
}
