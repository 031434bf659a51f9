//! Organization entity.

use crate::OrgId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tenant. Every user, template, report and notification belongs to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub email: Option<String>,
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
