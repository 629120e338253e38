pub mod assertions;
pub mod builders;
pub mod fixtures;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use convene::{api::create_router, config::StoreBackend, AppState, Config};
use convene_query::MemoryStore;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt as _;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// Memory-backed app seeded with [`fixtures::seed`], gateway-header auth.
    pub async fn new() -> anyhow::Result<Self> {
        Self::new_with_config(|_| {}).await
    }

    pub async fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let mut config = Config::default();
        config.database.backend = StoreBackend::Memory;
        config.auth.enabled = false;
        config.auth.jwt_secret = constants::JWT_SECRET.to_string();
        configure(&mut config);
        config.validate().context("validate test config")?;

        let store = Arc::new(MemoryStore::from_seed(seed()).context("seed memory store")?);
        let state = AppState::with_store(config, store.clone());
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            store,
        })
    }

    /// GET as a member of tenant A.
    pub async fn get(&self, path_and_query: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.get_as(constants::TENANT_A, path_and_query).await
    }

    pub async fn get_as(
        &self,
        tenant: &str,
        path_and_query: &str,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let (status, _headers, body) = self
            .request_with_extra_headers(
                Method::GET,
                path_and_query,
                &[("x-tenant-id", tenant), ("x-user-id", "test-user")],
            )
            .await?;
        Ok((status, parse_body(&body)?))
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path_and_query: &str,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("host", "example.org")
            .header("accept", "application/json")
            .body(Body::empty())
            .context("build request")?;

        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }
}

fn parse_body(body: &Bytes) -> anyhow::Result<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).context("parse response body as JSON")
}
