use proc_macro::TokenStream;

mod derive_utils;
mod domain_event;
mod entity;
mod field_utils;

/// 聚合宏
/// - 追加字段：`id: Uuid`, `version: usize`, `class_id: Option<ClassId>`（若缺失）并置于字段最前，
///   以及不参与序列化的 `changes: AggregateChanges`
/// - 实现 `Entity`、`ClassIdEntity`、`PersistentEntity`、`AggregateRoot`
/// - 参数：`#[aggregate(table = "...", class_id = true|false, debug = true|false)]`
///   - `table` 默认为结构体名
///   - `class_id` 默认 `true`；为 `false` 时不参与类标识标记
///   - `debug` 默认 `true`；为 `false` 时不派生 Debug
#[proc_macro_attribute]
pub fn aggregate(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(entity::Kind::Aggregate, attr, item)
}

/// 实体宏：与 `#[aggregate]` 相同，但不生成聚合根能力（无未提交事件）
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(entity::Kind::Entity, attr, item)
}

/// 领域事件宏
/// - 用于枚举（任意变体形态）或结构体
/// - 生成 `DomainEvent` 实现：事件类型默认 `Enum.Variant`（结构体为结构体名），版本默认 1
/// - 参数：`#[domain_event(version = N)]`；结构体还可使用 `event_type = "..."`
/// - 变体可覆写：`#[event(event_type = "...", event_version = N)]`
#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    domain_event::expand(attr, item)
}
