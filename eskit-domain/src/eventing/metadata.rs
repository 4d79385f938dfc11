//! 事件消息的标准元数据键

/// 聚合类型的类标识（由聚合存储在提交阶段写入）
pub const AGGREGATE_CLASS_ID: &str = "aggregate_class_id";

pub const EVENT_ID: &str = "event_id";
pub const EVENT_TYPE: &str = "event_type";
pub const EVENT_VERSION: &str = "event_version";
pub const AGGREGATE_ID: &str = "aggregate_id";
pub const AGGREGATE_VERSION: &str = "aggregate_version";
pub const OCCURRED_AT: &str = "occurred_at";

pub const CORRELATION_ID: &str = "correlation_id";
pub const CAUSATION_ID: &str = "causation_id";
pub const ACTOR_TYPE: &str = "actor_type";
pub const ACTOR_ID: &str = "actor_id";
