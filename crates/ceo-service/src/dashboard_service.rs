//! Dashboard service implementation.

use crate::dto::ActivityResponse;
use ceo_core::{
    CeoError, CeoResult, DashboardOverview, Interface, PageRequest, TeamOverview, UserId,
    UserPerformance,
};
use ceo_repository::{DashboardRepository, UserRepository};
use ceo_security::{Claims, ClaimsExt};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

/// Window used by the overview, performance and team pages.
const STATS_WINDOW_DAYS: i64 = 30;

/// Window used by the activity-by-hour histogram.
const HOURLY_WINDOW_DAYS: i64 = 7;

fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

/// Dashboard service trait.
#[async_trait]
pub trait DashboardService: Interface + Send + Sync {
    /// Organization overview.
    async fn overview(&self, claims: &Claims) -> CeoResult<DashboardOverview>;

    /// Activity feed of the caller's organization.
    async fn activity(&self, claims: &Claims, page: PageRequest) -> CeoResult<ActivityResponse>;

    /// Performance of one member. The member themself or a manager.
    async fn performance(&self, claims: &Claims, user_id: UserId) -> CeoResult<UserPerformance>;

    /// Team overview. CEO or project manager.
    async fn team(&self, claims: &Claims) -> CeoResult<TeamOverview>;
}

/// Dashboard service implementation.
pub struct DashboardServiceImpl {
    dashboards: Arc<dyn DashboardRepository>,
    users: Arc<dyn UserRepository>,
}

impl DashboardServiceImpl {
    /// Creates a new dashboard service.
    pub fn new(dashboards: Arc<dyn DashboardRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { dashboards, users }
    }
}

#[async_trait]
impl DashboardService for DashboardServiceImpl {
    async fn overview(&self, claims: &Claims) -> CeoResult<DashboardOverview> {
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, "Building dashboard overview");

        let since = days_ago(STATS_WINDOW_DAYS);
        let (metrics, user_stats, report_stats, trends) = futures::try_join!(
            self.dashboards.latest_metrics(org_id),
            self.dashboards.user_stats(org_id),
            self.dashboards.report_stats(org_id, since),
            self.dashboards.trends(org_id, since),
        )?;

        Ok(DashboardOverview {
            metrics: metrics.unwrap_or_else(|| serde_json::json!({})),
            user_stats,
            report_stats,
            trends,
        })
    }

    async fn activity(&self, claims: &Claims, page: PageRequest) -> CeoResult<ActivityResponse> {
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, "Listing activity, page: {}, limit: {}", page.page, page.limit);

        let activity = self.dashboards.activity(org_id, page).await?;
        Ok(ActivityResponse {
            activities: activity.items,
            pagination: activity.pagination,
        })
    }

    async fn performance(&self, claims: &Claims, user_id: UserId) -> CeoResult<UserPerformance> {
        claims.require_self_or_manager(user_id)?;
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, user_id = %user_id, "Building performance page");

        if self.users.find_member(user_id, org_id).await?.is_none() {
            return Err(CeoError::not_found("User", user_id));
        }

        let since = days_ago(STATS_WINDOW_DAYS);
        let (stats, timeline, report_types) = futures::try_join!(
            self.dashboards.performance_stats(org_id, user_id, since),
            self.dashboards.performance_timeline(org_id, user_id, since),
            self.dashboards.report_types(org_id, user_id, since),
        )?;

        Ok(UserPerformance {
            user_id,
            stats,
            timeline,
            report_types,
        })
    }

    async fn team(&self, claims: &Claims) -> CeoResult<TeamOverview> {
        claims.require_manager()?;
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, "Building team overview");

        let (members, activity_by_hour) = futures::try_join!(
            self.dashboards.team_stats(org_id, days_ago(STATS_WINDOW_DAYS)),
            self.dashboards.activity_by_hour(org_id, days_ago(HOURLY_WINDOW_DAYS)),
        )?;

        Ok(TeamOverview {
            members,
            activity_by_hour,
        })
    }
}

impl std::fmt::Debug for DashboardServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardServiceImpl").finish_non_exhaustive()
    }
}
