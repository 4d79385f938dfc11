//! 持久化协议（persist）
//!
//! 定义聚合存储所消费的 CRUD 仓储协议：
//! - 实体状态（`EntityState`）与变更跟踪；
//! - 可持久化实体的能力接口（`PersistentEntity`）及其对象安全视图（`TrackedEntity`）；
//! - 惰性、可重复求值的查询描述（`Query`）；
//! - 同步/异步成对的仓储操作（`CrudRepository`）。
//!
//! 该模块只定义协议，具体存储后端（如内存实现）由上层提供并注入。
//!
mod crud_repository;
mod entity_state;
mod persistent_entity;
mod query;

pub use crud_repository::CrudRepository;
pub use entity_state::EntityState;
pub use persistent_entity::{PersistentEntity, TrackedEntity};
pub use query::Query;
