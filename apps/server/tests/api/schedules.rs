//! `/api/event-schedules` listing and detail.

use crate::support::constants::*;
use crate::support::*;
use axum::http::StatusCode;
use serde_json::Value;

fn speaker_names(schedule: &Value) -> Vec<&str> {
    schedule["speakers"]
        .as_array()
        .map(|s| s.iter().filter_map(|s| s["name"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn lists_by_start_time_with_joins() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, page) = app.get("/api/event-schedules").await?;

    assert_status(status, StatusCode::OK, "list schedules");
    assert_page(&page, 3, 1, 1);
    assert_eq!(
        item_strings(&page, "title")?,
        ["Opening keynote", "Compiler workshop", "Data panel"]
    );

    let items = page_items(&page)?;
    assert_eq!(items[0]["eventTitle"], "RustConf");
    assert_eq!(speaker_names(&items[0]), ["Ada"]);
    assert_eq!(speaker_names(&items[1]), ["Ada", "Grace"]);
    for item in items {
        assert!(item.get("event").is_none(), "{item}");
        assert!(item.get("eventObjectId").is_none(), "{item}");
    }
    Ok(())
}

#[tokio::test]
async fn upper_case_event_reference_still_joins() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, schedule) = app.get(&format!("/api/event-schedules/{WORKSHOP}")).await?;

    assert_status(status, StatusCode::OK, "get workshop");
    assert_eq!(schedule["eventTitle"], "RustConf");
    assert_eq!(schedule["eventId"], RUSTCONF.to_uppercase());
    Ok(())
}

#[tokio::test]
async fn malformed_event_reference_keeps_raw_id() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, schedule) = app.get(&format!("/api/event-schedules/{PANEL}")).await?;

    assert_eq!(schedule["eventId"], "legacy-event-7");
    assert!(schedule.get("eventTitle").is_none(), "{schedule}");
    Ok(())
}

#[tokio::test]
async fn non_text_event_references_are_listed_without_event_id() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let first = "5e0000000000000000000001";
    let second = "5e0000000000000000000002";
    app.store
        .insert(
            "event_schedules",
            ScheduleBuilder::new(first, TENANT_C, "", "Null reference")
                .set("eventId", Value::Null)
                .build(),
        )
        .await;
    app.store
        .insert(
            "event_schedules",
            ScheduleBuilder::new(second, TENANT_C, "", "Numeric reference")
                .set("eventId", serde_json::json!(42))
                .times("2024-05-01T11:00:00.000Z", "2024-05-01T12:00:00.000Z")
                .build(),
        )
        .await;

    let (status, page) = app.get_as(TENANT_C, "/api/event-schedules").await?;
    assert_status(status, StatusCode::OK, "list schedules");
    assert_page(&page, 2, 1, 1);
    assert_eq!(
        item_strings(&page, "title")?,
        ["Null reference", "Numeric reference"]
    );
    for item in page_items(&page)? {
        assert!(item.get("eventId").is_none(), "{item}");
        assert!(item.get("eventTitle").is_none(), "{item}");
    }

    let (status, _) = app
        .get_as(TENANT_C, &format!("/api/event-schedules/{second}"))
        .await?;
    assert_status(status, StatusCode::OK, "get schedule");
    Ok(())
}

#[tokio::test]
async fn start_times_sort_as_instants_across_offsets() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.store
        .insert_many(
            "event_schedules",
            [
                ScheduleBuilder::new("5e0000000000000000000011", TENANT_C, RUSTCONF, "Utc session")
                    .times("2024-05-01T09:00:00Z", "2024-05-01T10:00:00Z")
                    .build(),
                ScheduleBuilder::new("5e0000000000000000000012", TENANT_C, RUSTCONF, "Offset session")
                    .times("2024-05-01T10:00:00+02:00", "2024-05-01T11:00:00+02:00")
                    .build(),
            ],
        )
        .await;

    let (_, page) = app.get_as(TENANT_C, "/api/event-schedules").await?;
    assert_eq!(
        item_strings(&page, "title")?,
        ["Offset session", "Utc session"]
    );
    Ok(())
}

#[tokio::test]
async fn speakers_from_another_tenant_are_not_joined() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, schedule) = app.get(&format!("/api/event-schedules/{PANEL}")).await?;

    assert_eq!(speaker_names(&schedule), ["Grace"]);
    Ok(())
}

#[tokio::test]
async fn search_reaches_joined_speakers_and_event() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (_, page) = app.get("/api/event-schedules?search=cobol").await?;
    assert_eq!(
        item_strings(&page, "title")?,
        ["Compiler workshop", "Data panel"]
    );

    let (_, page) = app.get("/api/event-schedules?search=rustconf").await?;
    assert_eq!(
        item_strings(&page, "title")?,
        ["Opening keynote", "Compiler workshop"]
    );

    let (_, page) = app.get("/api/event-schedules?search=studio").await?;
    assert_eq!(item_strings(&page, "title")?, ["Data panel"]);
    Ok(())
}

#[tokio::test]
async fn search_is_a_literal_substring() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, page) = app.get("/api/event-schedules?search=.*").await?;

    assert_status(status, StatusCode::OK, "regex-looking search");
    assert_page(&page, 0, 1, 1);
    Ok(())
}

#[tokio::test]
async fn open_ended_time_window() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (_, page) = app
        .get("/api/event-schedules?startTimeFrom=2024-05-01T10:30:00Z")
        .await?;
    assert_eq!(
        item_strings(&page, "title")?,
        ["Compiler workshop", "Data panel"]
    );

    let (_, page) = app
        .get("/api/event-schedules?endTimeTo=2024-05-01T12:00:00Z")
        .await?;
    assert_eq!(item_strings(&page, "title")?, ["Opening keynote"]);
    Ok(())
}

#[tokio::test]
async fn event_speaker_and_session_type_filters() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (_, page) = app
        .get(&format!("/api/event-schedules?eventId={RUSTCONF}"))
        .await?;
    assert_eq!(
        item_strings(&page, "title")?,
        ["Opening keynote", "Compiler workshop"]
    );

    let (_, page) = app
        .get(&format!("/api/event-schedules?speakerId={GRACE}"))
        .await?;
    assert_eq!(
        item_strings(&page, "title")?,
        ["Compiler workshop", "Data panel"]
    );

    let (_, page) = app.get("/api/event-schedules?sessionType=KEYNOTE").await?;
    assert_eq!(item_strings(&page, "title")?, ["Opening keynote"]);

    let (status, body) = app.get("/api/event-schedules?eventId=legacy-event-7").await?;
    assert_invalid_field(status, &body, "eventId");
    Ok(())
}

#[tokio::test]
async fn text_filters_are_bounded() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let long = "x".repeat(201);
    let (status, body) = app
        .get(&format!("/api/event-schedules?title={long}"))
        .await?;
    assert_invalid_field(status, &body, "title");
    Ok(())
}

#[tokio::test]
async fn paging_reports_total_pages() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, page) = app.get("/api/event-schedules?limit=2&page=2").await?;

    assert_page(&page, 3, 2, 2);
    assert_eq!(page["limit"], 2);
    assert_eq!(item_strings(&page, "title")?, ["Data panel"]);
    Ok(())
}

#[tokio::test]
async fn tenants_only_see_their_own_schedules() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, page) = app.get_as(TENANT_B, "/api/event-schedules").await?;

    assert_page(&page, 1, 1, 1);
    let items = page_items(&page)?;
    assert_eq!(items[0]["eventTitle"], "Tenant B Conf");
    assert_eq!(items[0]["speakers"][0]["company"], "Other Corp");

    let (_, page) = app.get_as(TENANT_C, "/api/event-schedules").await?;
    assert_page(&page, 0, 1, 1);
    Ok(())
}

#[tokio::test]
async fn foreign_tenant_claim_yields_an_empty_page() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, page) = app
        .get(&format!("/api/event-schedules?tenantId={TENANT_B}"))
        .await?;
    assert_status(status, StatusCode::OK, "foreign claim");
    assert_page(&page, 0, 1, 1);
    assert!(page_items(&page)?.is_empty());

    let (_, page) = app.get("/api/event-schedules?tenantId=acme").await?;
    assert_page(&page, 0, 1, 1);

    let (_, page) = app
        .get(&format!("/api/event-schedules?tenantId={TENANT_A}"))
        .await?;
    assert_page(&page, 3, 1, 1);
    Ok(())
}

#[tokio::test]
async fn detail_not_found_and_bad_id() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, _) = app
        .get_as(TENANT_B, &format!("/api/event-schedules/{KEYNOTE}"))
        .await?;
    assert_status(status, StatusCode::NOT_FOUND, "other tenant's schedule");

    let (status, body) = app.get("/api/event-schedules/123").await?;
    assert_invalid_field(status, &body, "id");
    Ok(())
}
