//! Dashboard DTOs.

use ceo_core::{ActivityItem, PageInfo};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Paginated activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponse {
    pub activities: Vec<ActivityItem>,
    pub pagination: PageInfo,
}
