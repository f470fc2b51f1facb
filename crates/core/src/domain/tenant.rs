// Tenant Domain Model

use serde::{Deserialize, Serialize};

/// Tenant identifier (one isolated site of the network)
pub type TenantId = i64;

/// Resolved tenant identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: TenantId,
    pub domain: String,
}

impl TenantRecord {
    pub fn new(id: TenantId, domain: impl Into<String>) -> Self {
        Self {
            id,
            domain: domain.into(),
        }
    }
}

/// Tenant ids are positive integers; zero and negatives never name a tenant
pub fn is_valid_tenant_id(id: TenantId) -> bool {
    id > 0
}

/// Parse untyped input (CLI args, query strings) into a tenant id
///
/// Returns `None` for zero, negative or non-numeric input.
pub fn parse_tenant_id(raw: &str) -> Option<TenantId> {
    raw.trim()
        .parse::<TenantId>()
        .ok()
        .filter(|id| is_valid_tenant_id(*id))
}
