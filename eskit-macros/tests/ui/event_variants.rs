use eskit_domain::domain_event::DomainEvent;
use eskit_macros::domain_event;

#[domain_event(version = 3)]
enum LedgerEvent {
    #[event(event_type = "ledger.opened")]
    Opened { owner: String },
    #[event(event_version = 1)]
    Credited(u64),
    Closed,
}

#[domain_event(event_type = "ledger.audited", version = 2)]
struct LedgerAudited {
    auditor: String,
}

fn main() {
    let opened = LedgerEvent::Opened { owner: "bob".into() };
    assert_eq!(opened.event_type(), "ledger.opened");
    assert_eq!(opened.event_version(), 3);

    let credited = LedgerEvent::Credited(10);
    assert_eq!(credited.event_type(), "LedgerEvent.Credited");
    assert_eq!(credited.event_version(), 1);

    assert_eq!(LedgerEvent::Closed.event_type(), "LedgerEvent.Closed");
    assert_eq!(LedgerEvent::Closed.clone(), LedgerEvent::Closed);

    let audited = LedgerAudited { auditor: "eve".into() };
    assert_eq!(audited.event_type(), "ledger.audited");
    assert_eq!(audited.event_version(), 2);
}
