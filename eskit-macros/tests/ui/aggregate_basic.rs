use eskit_domain::aggregate::Aggregate;
use eskit_domain::aggregate_root::AggregateRoot;
use eskit_domain::class_id::ClassIdEntity;
use eskit_domain::entity::Entity;
use eskit_domain::persist::PersistentEntity;
use eskit_macros::{aggregate, domain_event};

#[aggregate(table = "accounts")]
struct Account {
    name: String,
}

#[domain_event]
enum AccountEvent {
    Opened { name: String },
}

impl Aggregate for Account {
    type Event = AccountEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Opened { name } => self.name = name.clone(),
        }
    }
}

fn main() {
    let id = uuid::Uuid::new_v4();
    let mut account = Account::new(id, 0);
    account.raise(AccountEvent::Opened { name: "alice".into() });

    assert_eq!(account.id(), id);
    assert_eq!(account.version(), 1);
    assert!(account.is_changed());
    assert!(account.class_id().is_none());
    assert_eq!(<Account as PersistentEntity>::TABLE, "accounts");
    assert!(account.as_aggregate_root().is_some());
}
