//! `/api/speakers` listing, detail and schedules-by-speaker.

use crate::support::constants::*;
use crate::support::*;
use axum::http::StatusCode;

#[tokio::test]
async fn lists_speakers_by_name() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, page) = app.get("/api/speakers").await?;

    assert_status(status, StatusCode::OK, "list speakers");
    assert_page(&page, 3, 1, 1);
    assert_eq!(item_strings(&page, "name")?, ["Ada", "Grace", "Linus"]);
    Ok(())
}

#[tokio::test]
async fn name_company_and_search_filters() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (_, page) = app.get("/api/speakers?company=acme").await?;
    assert_eq!(item_strings(&page, "name")?, ["Ada", "Linus"]);

    let (_, page) = app.get("/api/speakers?search=kern").await?;
    assert_eq!(item_strings(&page, "name")?, ["Linus"]);

    let (_, page) = app.get("/api/speakers?name=a&company=navy").await?;
    assert_eq!(item_strings(&page, "name")?, ["Grace"]);

    let (status, body) = app.get("/api/speakers?speakerType=HEADLINER").await?;
    assert_invalid_field(status, &body, "speakerType");
    Ok(())
}

#[tokio::test]
async fn same_name_in_another_tenant_stays_separate() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, page) = app.get_as(TENANT_B, "/api/speakers?name=ada").await?;

    assert_page(&page, 1, 1, 1);
    assert_eq!(item_strings(&page, "company")?, ["Other Corp"]);
    Ok(())
}

#[tokio::test]
async fn detail_lookup() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, speaker) = app.get(&format!("/api/speakers/{GRACE}")).await?;
    assert_status(status, StatusCode::OK, "get speaker");
    assert_eq!(speaker["name"], "Grace");
    assert_eq!(speaker["email"], "grace@example.com");

    let (status, _) = app.get(&format!("/api/speakers/{B_ADA}")).await?;
    assert_status(status, StatusCode::NOT_FOUND, "other tenant's speaker");
    Ok(())
}

#[tokio::test]
async fn schedules_of_a_speaker() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, page) = app.get(&format!("/api/speakers/{ADA}/schedules")).await?;
    assert_status(status, StatusCode::OK, "speaker schedules");
    assert_eq!(
        item_strings(&page, "title")?,
        ["Opening keynote", "Compiler workshop"]
    );

    let (_, page) = app
        .get(&format!("/api/speakers/{ADA}/schedules?sessionType=WORKSHOP"))
        .await?;
    assert_eq!(item_strings(&page, "title")?, ["Compiler workshop"]);

    let (_, page) = app.get(&format!("/api/speakers/{LINUS}/schedules")).await?;
    assert_page(&page, 0, 1, 1);

    let (status, body) = app.get("/api/speakers/ada/schedules").await?;
    assert_invalid_field(status, &body, "speakerId");
    Ok(())
}

#[tokio::test]
async fn speaker_schedules_and_query_speaker_are_both_applied() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, page) = app
        .get(&format!("/api/speakers/{ADA}/schedules?speakerId={GRACE}"))
        .await?;

    assert_eq!(item_strings(&page, "title")?, ["Compiler workshop"]);
    Ok(())
}
