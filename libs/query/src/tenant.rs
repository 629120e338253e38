//! Tenant scoping.
//!
//! Every compiled plan starts with `tenantId == caller tenant`. The tenant always comes
//! from the authenticated [`TenantContext`], never from filter input. A filter may
//! additionally name a tenant; when that claim differs from the caller's tenant the
//! request resolves to [`TenantScope::Mismatch`] and yields an empty page.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clause::{Clause, Scalar};
use crate::id::{IdError, ObjectId};

pub const TENANT_FIELD: &str = "tenantId";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(ObjectId);

impl TenantId {
    pub fn new(id: ObjectId) -> Self {
        Self(id)
    }

    pub fn parse(value: &str) -> Result<Self, IdError> {
        ObjectId::parse(value).map(Self)
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    /// Clause restricting documents to this tenant.
    pub fn clause(&self) -> Clause {
        Clause::equals(TENANT_FIELD, Scalar::Id(self.0))
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identity of the caller as resolved by the host's authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id,
            user_id: user_id.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TenantScope {
    Scoped { tenant: TenantId, clause: Clause },
    Mismatch,
}

impl TenantScope {
    /// Malformed claims are treated as a mismatch.
    pub fn resolve(ctx: &TenantContext, claim: Option<&str>) -> Self {
        match claim {
            Some(claim) => match TenantId::parse(claim.trim()) {
                Ok(claimed) if claimed == ctx.tenant_id => Self::scoped(ctx.tenant_id),
                _ => Self::Mismatch,
            },
            None => Self::scoped(ctx.tenant_id),
        }
    }

    fn scoped(tenant: TenantId) -> Self {
        Self::Scoped {
            tenant,
            clause: tenant.clause(),
        }
    }
}
