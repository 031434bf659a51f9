//! Periodic organization metrics snapshots.

use crate::error::{JobError, JobResult};
use crate::scheduler::ScheduledTask;
use async_trait::async_trait;
use ceo_core::{CeoResult, OrgId, OrgMetrics};
use ceo_repository::{DashboardRepository, OrganizationRepository};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Days of history each snapshot covers.
const METRICS_WINDOW_DAYS: i64 = 30;

/// Stores a 30-day metrics snapshot for every organization.
pub struct OrgMetricsTask {
    organizations: Arc<dyn OrganizationRepository>,
    dashboards: Arc<dyn DashboardRepository>,
}

impl OrgMetricsTask {
    pub const NAME: &'static str = "org_metrics";

    pub fn new(organizations: Arc<dyn OrganizationRepository>, dashboards: Arc<dyn DashboardRepository>) -> Self {
        Self {
            organizations,
            dashboards,
        }
    }

    async fn snapshot(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<OrgMetrics> {
        let metrics = OrgMetrics::from(self.dashboards.metrics_counts(org_id, since).await?);
        self.dashboards.store_metrics(org_id, &metrics).await?;
        Ok(metrics)
    }
}

#[async_trait]
impl ScheduledTask for OrgMetricsTask {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self) -> JobResult<()> {
        let since = Utc::now() - Duration::days(METRICS_WINDOW_DAYS);
        let org_ids = self.organizations.list_ids().await?;

        let mut failed = 0usize;
        for org_id in &org_ids {
            match self.snapshot(*org_id, since).await {
                Ok(metrics) => debug!(
                    org_id = %org_id,
                    total_reports = metrics.total_reports,
                    active_users = metrics.active_users,
                    "Stored metrics snapshot"
                ),
                Err(e) => {
                    failed += 1;
                    warn!(org_id = %org_id, error = %e, "Failed to compute organization metrics");
                }
            }
        }

        info!(organizations = org_ids.len(), failed, "Organization metrics calculated");
        if failed > 0 {
            return Err(JobError::ExecutionFailed(format!(
                "metrics failed for {failed} of {} organizations",
                org_ids.len()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for OrgMetricsTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrgMetricsTask").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::test_support::{StubDashboards, StubOrganizations};
    use ceo_core::MetricsCounts;

    #[tokio::test]
    async fn test_snapshot_for_every_org() {
        let dashboards = Arc::new(StubDashboards::default());
        dashboards.set_counts(
            OrgId(1),
            MetricsCounts {
                total_reports: 8,
                approved_reports: 6,
                average_review_hours: Some(4.5),
                active_users: 3,
            },
        );
        let task = OrgMetricsTask::new(
            Arc::new(StubOrganizations::new(vec![OrgId(1), OrgId(2)])),
            dashboards.clone(),
        );

        task.run().await.unwrap();

        let stored = dashboards.stored();
        assert_eq!(stored.len(), 2);
        let (org, acme) = stored[0];
        assert_eq!(org, OrgId(1));
        assert_eq!(acme.total_reports, 8);
        assert!((acme.report_completion - 75.0).abs() < f64::EPSILON);
        assert!((acme.average_review_time - 4.5).abs() < f64::EPSILON);
        assert_eq!(acme.active_users, 3);

        let (_, empty) = stored[1];
        assert_eq!(empty.total_reports, 0);
        assert!(empty.report_completion.abs() < f64::EPSILON);
        assert!(empty.average_review_time.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_one_failing_org_does_not_stop_others() {
        let dashboards = Arc::new(StubDashboards::default());
        dashboards.fail_for(OrgId(1));
        let task = OrgMetricsTask::new(
            Arc::new(StubOrganizations::new(vec![OrgId(1), OrgId(2), OrgId(3)])),
            dashboards.clone(),
        );

        let err = task.run().await.unwrap_err();
        assert!(err.to_string().contains("1 of 3"));
        let orgs: Vec<OrgId> = dashboards.stored().into_iter().map(|(org, _)| org).collect();
        assert_eq!(orgs, vec![OrgId(2), OrgId(3)]);
    }

    #[tokio::test]
    async fn test_no_organizations() {
        let dashboards = Arc::new(StubDashboards::default());
        let task = OrgMetricsTask::new(Arc::new(StubOrganizations::new(vec![])), dashboards.clone());
        task.run().await.unwrap();
        assert!(dashboards.stored().is_empty());
    }
}
