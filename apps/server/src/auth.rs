//! Tenant context resolution.
//!
//! Every `/api` request must carry the caller's identity. With `auth.enabled` the
//! identity comes from an HS256 bearer token (`sub`, `tenant_id`, `roles`). Without it,
//! the server trusts the gateway headers `x-tenant-id`, `x-user-id` and `x-user-roles`.
//! The resolved [`TenantContext`] is stored in the request extensions.

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use convene_query::{TenantContext, TenantId};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, state::AppState, Error};

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";
pub const ROLES_HEADER: &str = "x-user-roles";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub tenant_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    MissingTenant,
    InvalidTenant,
}

impl AuthError {
    fn diagnostics(&self) -> String {
        match self {
            Self::MissingToken => "Missing bearer token".to_string(),
            Self::InvalidToken(msg) => format!("Invalid bearer token: {msg}"),
            Self::MissingTenant => "Missing tenant context".to_string(),
            Self::InvalidTenant => "Tenant id is not a valid identifier".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let bearer = matches!(self, Self::MissingToken | Self::InvalidToken(_));
        let mut response = Error::Unauthenticated(self.diagnostics()).into_response();
        if bearer {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub struct TenantAuthenticator {
    enabled: bool,
    key: DecodingKey,
    validation: Validation,
}

impl TenantAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            enabled: config.enabled,
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<TenantContext, AuthError> {
        if self.enabled {
            self.from_token(headers)
        } else {
            from_gateway_headers(headers)
        }
    }

    fn from_token(&self, headers: &HeaderMap) -> Result<TenantContext, AuthError> {
        let authz = headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| {
                AuthError::InvalidToken("Authorization header is not valid UTF-8".to_string())
            })?;

        let token = authz
            .strip_prefix("Bearer ")
            .or_else(|| authz.strip_prefix("bearer "))
            .ok_or_else(|| {
                AuthError::InvalidToken("Authorization header must be 'Bearer <token>'".to_string())
            })?;

        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        let tenant = TenantId::parse(claims.tenant_id.trim()).map_err(|_| AuthError::InvalidTenant)?;
        Ok(TenantContext::new(tenant, claims.sub).with_roles(claims.roles))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn from_gateway_headers(headers: &HeaderMap) -> Result<TenantContext, AuthError> {
    let tenant = header_str(headers, TENANT_HEADER).ok_or(AuthError::MissingTenant)?;
    let tenant = TenantId::parse(tenant).map_err(|_| AuthError::InvalidTenant)?;
    let user = header_str(headers, USER_HEADER).unwrap_or("anonymous");
    let roles = header_str(headers, ROLES_HEADER)
        .map(|r| {
            r.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    Ok(TenantContext::new(tenant, user).with_roles(roles))
}

/// Extractor for the tenant context attached by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct Tenant(pub TenantContext);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .map(Tenant)
            .ok_or_else(|| AuthError::MissingTenant.into_response())
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if req.method() == axum::http::Method::OPTIONS {
        return next.run(req).await;
    }

    match state.auth.authenticate(req.headers()) {
        Ok(ctx) => {
            tracing::Span::current().record("tenant", tracing::field::display(&ctx.tenant_id));
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!(
                path = %req.uri().path(),
                reason = %err.diagnostics(),
                "Rejected request without tenant context"
            );
            err.into_response()
        }
    }
}
