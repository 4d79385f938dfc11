//! 聚合持久化基础设施层（eskit-infra）
//!
//! - `aggregate_store`：聚合存储（标记 → 持久化 → 提交 的保存协议）与路由存储
//! - `in_memory`：带变更跟踪的内存 CRUD 仓储与共享内存数据库
//! - `naming`：存储表名命名约定
//! - `unit_of_work`：工作单元（保存后将缓冲区冲刷到事件总线）
//! - `config`、`telemetry`：配置加载与日志初始化
//!
pub mod aggregate_store;
pub mod config;
pub mod error;
pub mod in_memory;
pub mod naming;
pub mod telemetry;
pub mod unit_of_work;

pub use aggregate_store::{
    AggregateStore, CrudAggregateStore, LoggingReconciliationHook, ReconciliationHook,
    ReconciliationReport, RoutingAggregateStore, SaveSummary,
};
pub use config::{ConfigError, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use in_memory::{InMemoryCrudRepository, InMemoryDatabase};
pub use unit_of_work::{Completion, InMemoryUnitOfWorkFactory, UnitOfWork};
