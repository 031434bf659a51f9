//! Application state for Axum handlers.

use ceo_repository::DatabasePoolInterface;
use ceo_service::{
    AuthService, DashboardService, NotificationService, OrganizationService, ReportService,
    UserService,
};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub organization_service: Arc<dyn OrganizationService>,
    pub report_service: Arc<dyn ReportService>,
    pub dashboard_service: Arc<dyn DashboardService>,
    pub notification_service: Arc<dyn NotificationService>,
    pub database: Arc<dyn DatabasePoolInterface>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        organization_service: Arc<dyn OrganizationService>,
        report_service: Arc<dyn ReportService>,
        dashboard_service: Arc<dyn DashboardService>,
        notification_service: Arc<dyn NotificationService>,
        database: Arc<dyn DatabasePoolInterface>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            organization_service,
            report_service,
            dashboard_service,
            notification_service,
            database,
        }
    }
}
