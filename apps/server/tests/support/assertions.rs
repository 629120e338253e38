use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "{context}: unexpected status");
}

/// Checks the list envelope and returns its items.
pub fn page_items(page: &Value) -> anyhow::Result<&Vec<Value>> {
    for key in ["total", "page", "limit", "totalPages"] {
        assert!(
            page.get(key).and_then(Value::as_u64).is_some(),
            "page envelope is missing numeric '{key}': {page}"
        );
    }
    page.get("items")
        .and_then(Value::as_array)
        .context("page.items is an array")
}

pub fn assert_page(page: &Value, total: u64, page_no: u64, total_pages: u64) {
    assert_eq!(page["total"], total, "total in {page}");
    assert_eq!(page["page"], page_no, "page in {page}");
    assert_eq!(page["totalPages"], total_pages, "totalPages in {page}");
}

/// Values of `field` across the page items, in order.
pub fn item_strings<'a>(page: &'a Value, field: &str) -> anyhow::Result<Vec<&'a str>> {
    page_items(page)?
        .iter()
        .map(|item| {
            item.get(field)
                .and_then(Value::as_str)
                .with_context(|| format!("item.{field} is a string in {item}"))
        })
        .collect()
}

pub fn assert_invalid_field(status: StatusCode, body: &Value, field: &str) {
    assert_status(status, StatusCode::BAD_REQUEST, field);
    assert_eq!(body["code"], "INVALID_INPUT", "error code in {body}");
    assert_eq!(body["field"], field, "error field in {body}");
    assert_eq!(body["retriable"], false);
}
