//! `/api/events` listing, detail and speakers-of-event.

use crate::support::constants::*;
use crate::support::*;
use axum::http::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn lists_tenant_events_by_start_date() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, page) = app.get("/api/events").await?;

    assert_status(status, StatusCode::OK, "list events");
    assert_page(&page, 2, 1, 1);
    assert_eq!(page["limit"], 10);
    assert_eq!(item_strings(&page, "title")?, ["RustConf", "Data Summit"]);
    Ok(())
}

#[tokio::test]
async fn schedules_are_joined_in_reference_order_and_stale_ids_dropped() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, page) = app.get("/api/events").await?;
    let items = page_items(&page)?;

    let titles = |event: &Value| -> Vec<String> {
        event["schedules"]
            .as_array()
            .map(|s| {
                s.iter()
                    .filter_map(|s| s["title"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    };
    assert_eq!(titles(&items[0]), ["Opening keynote", "Compiler workshop"]);
    assert_eq!(titles(&items[1]), ["Data panel"]);
    Ok(())
}

fn schedule_speakers(event: &Value) -> Vec<Vec<String>> {
    event["schedules"]
        .as_array()
        .map(|schedules| {
            schedules
                .iter()
                .map(|s| {
                    s["speakers"]
                        .as_array()
                        .map(|sp| {
                            sp.iter()
                                .filter_map(|sp| sp["name"].as_str().map(String::from))
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn embedded_schedules_carry_resolved_speakers() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, page) = app.get("/api/events").await?;
    let items = page_items(&page)?;

    assert_eq!(schedule_speakers(&items[0]), [vec!["Ada"], vec!["Ada", "Grace"]]);
    // The tenant B speaker on the panel is not resolved.
    assert_eq!(schedule_speakers(&items[1]), [vec!["Grace"]]);
    assert_eq!(items[0]["schedules"][0]["speakers"][0]["company"], "Acme");

    let (status, event) = app.get(&format!("/api/events/{RUSTCONF}")).await?;
    assert_status(status, StatusCode::OK, "get event");
    assert_eq!(schedule_speakers(&event), [vec!["Ada"], vec!["Ada", "Grace"]]);
    Ok(())
}

#[tokio::test]
async fn start_dates_sort_as_instants_across_offsets() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    // 10:00 at +02:00 is earlier than 09:00Z.
    app.store
        .insert_many(
            "events",
            [
                EventBuilder::new("ec0000000000000000000001", TENANT_C, "Utc morning")
                    .dates("2024-05-01T09:00:00Z", "2024-05-01T18:00:00Z")
                    .build(),
                EventBuilder::new("ec0000000000000000000002", TENANT_C, "Lisbon morning")
                    .dates("2024-05-01T10:00:00+02:00", "2024-05-01T18:00:00+02:00")
                    .build(),
            ],
        )
        .await;

    let (status, page) = app.get_as(TENANT_C, "/api/events").await?;
    assert_status(status, StatusCode::OK, "list events");
    assert_eq!(
        item_strings(&page, "title")?,
        ["Lisbon morning", "Utc morning"]
    );
    Ok(())
}

#[tokio::test]
async fn location_filter_matches_name_or_address() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (_, by_address) = app.get("/api/events?location=lisbon").await?;
    assert_eq!(item_strings(&by_address, "title")?, ["RustConf"]);

    let (_, by_name) = app.get("/api/events?location=HALL").await?;
    assert_eq!(item_strings(&by_name, "title")?, ["RustConf"]);

    let (_, nothing) = app.get("/api/events?location=Porto").await?;
    assert_page(&nothing, 0, 1, 1);
    Ok(())
}

#[tokio::test]
async fn search_term_takes_precedence_over_title() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, page) = app.get("/api/events?search=summit&title=RustConf").await?;

    assert_status(status, StatusCode::OK, "search with title");
    assert_eq!(item_strings(&page, "title")?, ["Data Summit"]);
    Ok(())
}

#[tokio::test]
async fn equality_and_range_filters() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (_, page) = app.get("/api/events?type=SUMMIT").await?;
    assert_eq!(item_strings(&page, "title")?, ["Data Summit"]);

    let (_, page) = app.get("/api/events?isPublic=false").await?;
    assert_eq!(item_strings(&page, "title")?, ["Data Summit"]);

    let (_, page) = app.get("/api/events?minParticipants=100").await?;
    assert_eq!(item_strings(&page, "title")?, ["RustConf"]);

    let (_, page) = app.get("/api/events?maxParticipants=100&currency=USD").await?;
    assert_eq!(item_strings(&page, "title")?, ["Data Summit"]);

    let (_, page) = app
        .get("/api/events?startDateFrom=2024-06-01T00:00:00Z")
        .await?;
    assert_eq!(item_strings(&page, "title")?, ["Data Summit"]);
    Ok(())
}

#[tokio::test]
async fn malformed_filters_name_the_field() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app.get("/api/events?type=PICNIC").await?;
    assert_invalid_field(status, &body, "type");

    let (status, body) = app.get("/api/events?minParticipants=-1").await?;
    assert_invalid_field(status, &body, "minParticipants");

    let (status, body) = app.get("/api/events?startDateFrom=yesterday").await?;
    assert_invalid_field(status, &body, "startDateFrom");

    let (status, body) = app.get("/api/events?isPublic=maybe").await?;
    assert_invalid_field(status, &body, "isPublic");
    Ok(())
}

#[tokio::test]
async fn paging_past_the_first_page() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, page) = app.get("/api/events?limit=1&page=2").await?;

    assert_page(&page, 2, 2, 2);
    assert_eq!(item_strings(&page, "title")?, ["Data Summit"]);

    let (_, beyond) = app.get("/api/events?limit=1&page=5").await?;
    assert_page(&beyond, 2, 5, 2);
    assert!(page_items(&beyond)?.is_empty());
    Ok(())
}

#[tokio::test]
async fn pagination_bounds_are_enforced() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app.get("/api/events?page=0").await?;
    assert_invalid_field(status, &body, "page");

    let (status, body) = app.get("/api/events?limit=101").await?;
    assert_invalid_field(status, &body, "limit");

    let (status, _) = app.get("/api/events?limit=100").await?;
    assert_status(status, StatusCode::OK, "limit at maximum");
    Ok(())
}

#[tokio::test]
async fn detail_is_tenant_scoped() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, event) = app.get(&format!("/api/events/{RUSTCONF}")).await?;
    assert_status(status, StatusCode::OK, "get event");
    assert_eq!(event["title"], "RustConf");
    assert_eq!(event["_id"], RUSTCONF);

    let (status, body) = app.get_as(TENANT_B, &format!("/api/events/{RUSTCONF}")).await?;
    assert_status(status, StatusCode::NOT_FOUND, "other tenant's event");
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = app.get("/api/events/not-an-id").await?;
    assert_invalid_field(status, &body, "id");
    Ok(())
}

#[tokio::test]
async fn speakers_of_event_are_distinct_and_sorted() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, page) = app.get(&format!("/api/events/{RUSTCONF}/speakers")).await?;

    assert_status(status, StatusCode::OK, "event speakers");
    assert_page(&page, 2, 1, 1);
    assert_eq!(item_strings(&page, "name")?, ["Ada", "Grace"]);
    for speaker in page_items(&page)? {
        assert!(speaker.get("appearances").is_none(), "{speaker}");
    }
    Ok(())
}

#[tokio::test]
async fn speakers_of_event_filters() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (_, page) = app
        .get(&format!("/api/events/{RUSTCONF}/speakers?company=acme"))
        .await?;
    assert_eq!(item_strings(&page, "name")?, ["Ada"]);

    // Name and company are alternatives.
    let (_, page) = app
        .get(&format!("/api/events/{RUSTCONF}/speakers?name=ada&company=navy"))
        .await?;
    assert_eq!(item_strings(&page, "name")?, ["Ada", "Grace"]);

    let (_, page) = app
        .get(&format!("/api/events/{RUSTCONF}/speakers?name=linus&company=acme"))
        .await?;
    assert_eq!(item_strings(&page, "name")?, ["Ada"]);

    let (_, page) = app
        .get(&format!("/api/events/{RUSTCONF}/speakers?search=pioneer"))
        .await?;
    assert_page(&page, 0, 1, 1);

    let (_, page) = app
        .get(&format!("/api/events/{RUSTCONF}/speakers?search=GRA"))
        .await?;
    assert_eq!(item_strings(&page, "name")?, ["Grace"]);
    Ok(())
}

#[tokio::test]
async fn speakers_of_event_without_schedules_is_empty() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    // The panel refers to its event by a legacy free-text id.
    let (status, page) = app
        .get(&format!("/api/events/{DATA_SUMMIT}/speakers"))
        .await?;
    assert_status(status, StatusCode::OK, "event speakers");
    assert_page(&page, 0, 1, 1);

    let (status, page) = app.get(&format!("/api/events/{STALE}/speakers")).await?;
    assert_status(status, StatusCode::OK, "unknown event");
    assert_page(&page, 0, 1, 1);
    Ok(())
}
