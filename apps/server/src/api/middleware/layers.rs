//! Layer factories for middleware

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
};

use crate::auth::{ROLES_HEADER, TENANT_HEADER, USER_HEADER};

/// CORS for the configured origins only. No origins means no CORS headers.
pub fn cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    if origins.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
            HeaderName::from_static(TENANT_HEADER),
            HeaderName::from_static(USER_HEADER),
            HeaderName::from_static(ROLES_HEADER),
        ])
}

pub fn compression() -> CompressionLayer {
    CompressionLayer::new()
}
