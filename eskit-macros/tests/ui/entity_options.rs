use eskit_domain::entity::Entity;
use eskit_domain::persist::PersistentEntity;
use eskit_macros::entity;
use std::fmt;

// 用户自定义 Debug，且不参与类标识标记
#[entity(class_id = false, debug = false)]
#[derive(PartialEq)]
struct Secret {
    value: String,
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

// 已存在的 id 字段被复用
#[entity(table = "notes")]
#[derive(serde::Serialize)]
struct Note {
    id: eskit_domain::Uuid,
    body: String,
}

fn main() {
    let secret = Secret::new(uuid::Uuid::new_v4(), 3);
    assert_eq!(format!("{secret:?}"), "Secret(..)");
    assert_eq!(secret.version(), 3);
    assert!(secret.as_class_id_entity().is_none());
    assert_eq!(<Secret as PersistentEntity>::TABLE, "Secret");

    let note = Note::new(uuid::Uuid::new_v4(), 0);
    assert!(note.as_class_id_entity().is_some());
    assert!(note.as_aggregate_root().is_none());
    assert_eq!(<Note as PersistentEntity>::TABLE, "notes");
}
