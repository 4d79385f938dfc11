//! 聚合持久化领域层（eskit-domain）
//!
//! 提供聚合持久化与事件发布所需的领域层抽象：
//! - 实体（`entity`）、聚合根（`aggregate_root`）与类型化聚合（`aggregate`）
//! - 类标识（`class_id`）与实体类型注册表（`entity_type`）
//! - 领域事件（`domain_event`）与事件消息草稿、消息工厂、发布缓冲区（`eventing`）
//! - CRUD 仓储协议、实体状态与查询描述（`persist`、`specification`）
//!
//! 本 crate 只定义协议与最小的内存实现，具体存储后端与聚合存储编排由
//! `eskit-infra` 提供。
//!
pub mod aggregate;
pub mod aggregate_root;
pub mod class_id;
pub mod domain_event;
pub mod entity;
pub mod entity_type;
pub mod error;
pub mod eventing;
pub mod persist;
pub mod specification;

pub use uuid::Uuid;

// 允许在本 crate 内部通过 ::eskit_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::eskit_domain 路径。
extern crate self as eskit_domain;
