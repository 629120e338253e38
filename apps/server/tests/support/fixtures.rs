use super::builders::{speaker, EventBuilder, ScheduleBuilder};
use serde_json::{json, Value};

pub mod constants {
    pub const TENANT_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaa";
    pub const TENANT_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbb";
    /// A well-formed tenant id with no data.
    pub const TENANT_C: &str = "cccccccccccccccccccccccc";
    pub const JWT_SECRET: &str = "test-secret-test-secret-test-secret";

    pub const RUSTCONF: &str = "e00000000000000000000001";
    pub const DATA_SUMMIT: &str = "e00000000000000000000002";
    pub const B_EVENT: &str = "eb0000000000000000000001";

    pub const ADA: &str = "5a0000000000000000000001";
    pub const GRACE: &str = "5a0000000000000000000002";
    pub const LINUS: &str = "5a0000000000000000000003";
    pub const B_ADA: &str = "5b0000000000000000000001";

    pub const KEYNOTE: &str = "5c0000000000000000000001";
    pub const WORKSHOP: &str = "5c0000000000000000000002";
    pub const PANEL: &str = "5c0000000000000000000003";
    pub const B_KEYNOTE: &str = "5d0000000000000000000001";

    /// Referenced by an event but never stored.
    pub const STALE: &str = "ffffffffffffffffffffffff";
}

use constants::*;

/// Two tenants. Tenant A:
///
/// - RustConf (May, Lisbon) with the keynote and the workshop; the workshop refers to
///   its event with an upper-case id
/// - Data Summit (June, online) whose schedule list contains a stale id
/// - the panel, whose `eventId` is legacy free text and whose speakers include a
///   tenant B speaker
/// - Ada and Grace speak; Linus never does
pub fn seed() -> Value {
    let events = vec![
        EventBuilder::new(RUSTCONF, TENANT_A, "RustConf")
            .set("description", json!("Systems programming in Rust"))
            .set("format", json!("IN_PERSON"))
            .set("numberOfParticipants", json!(300))
            .set("currency", json!("EUR"))
            .location("Hall A", "1 Main St, Lisbon")
            .schedules(&[KEYNOTE, WORKSHOP])
            .build(),
        EventBuilder::new(DATA_SUMMIT, TENANT_A, "Data Summit")
            .set("type", json!("SUMMIT"))
            .set("format", json!("ONLINE"))
            .set("status", json!("DRAFT"))
            .set("numberOfParticipants", json!(50))
            .set("currency", json!("USD"))
            .set("isPublic", json!(false))
            .dates("2024-06-10T08:00:00.000Z", "2024-06-11T18:00:00.000Z")
            .schedules(&[STALE, PANEL])
            .build(),
        EventBuilder::new(B_EVENT, TENANT_B, "Tenant B Conf")
            .schedules(&[B_KEYNOTE])
            .build(),
    ];

    let schedules = vec![
        ScheduleBuilder::new(KEYNOTE, TENANT_A, RUSTCONF, "Opening keynote")
            .set("sessionType", json!("KEYNOTE"))
            .set("location", json!("Hall A"))
            .speakers(&[ADA])
            .build(),
        ScheduleBuilder::new(WORKSHOP, TENANT_A, &RUSTCONF.to_uppercase(), "Compiler workshop")
            .set("sessionType", json!("WORKSHOP"))
            .set("location", json!("Room 2"))
            .times("2024-05-01T11:00:00.000Z", "2024-05-01T13:00:00.000Z")
            .speakers(&[ADA, GRACE])
            .build(),
        ScheduleBuilder::new(PANEL, TENANT_A, "legacy-event-7", "Data panel")
            .set("sessionType", json!("PANEL_DISCUSSION"))
            .set("location", json!("Studio"))
            .times("2024-06-10T09:00:00.000Z", "2024-06-10T10:00:00.000Z")
            .speakers(&[GRACE, B_ADA])
            .build(),
        ScheduleBuilder::new(B_KEYNOTE, TENANT_B, B_EVENT, "Opening keynote")
            .speakers(&[B_ADA])
            .build(),
    ];

    let speakers = vec![
        speaker(ADA, TENANT_A, "Ada", "Acme", "Writes compilers"),
        speaker(GRACE, TENANT_A, "Grace", "Navy", "COBOL pioneer"),
        speaker(LINUS, TENANT_A, "Linus", "Acme", "Kernels"),
        speaker(B_ADA, TENANT_B, "Ada", "Other Corp", "Tenant B twin"),
    ];

    json!({
        "events": events,
        "event_schedules": schedules,
        "speakers": speakers,
    })
}
