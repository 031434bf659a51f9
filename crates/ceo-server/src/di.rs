//! Dependency wiring.
//!
//! Every component is an `Arc<dyn Trait>` built once at startup and shared
//! by the HTTP handlers and the scheduled tasks.

use ceo_config::{AppConfig, SchedulerConfig};
use ceo_core::{CeoError, CeoResult};
use ceo_jobs::{OrgMetricsTask, ReportReminderTask, Scheduler};
use ceo_notify::{create_email_sender, create_whatsapp_sender, EmailTemplates, WhatsAppSender};
use ceo_repository::{
    DashboardRepository, DatabasePoolInterface, NotificationRepository, OrganizationRepository,
    PgDashboardRepository, PgNotificationRepository, PgOrganizationRepository,
    PgReportRepository, PgUserRepository, ReportRepository, UserRepository,
};
use ceo_rest::AppState;
use ceo_security::{PasswordHasher, PasswordHasherInterface, TokenProvider, TokenProviderInterface};
use ceo_service::{
    AuthServiceImpl, DashboardServiceImpl, Mailer, NotificationServiceImpl,
    OrganizationServiceImpl, ReportServiceImpl, UserServiceImpl,
};
use std::sync::Arc;
use tracing::info;

/// Fully wired application components.
#[derive(Clone)]
pub struct AppContainer {
    pub database: Arc<dyn DatabasePoolInterface>,
    pub token_provider: Arc<dyn TokenProviderInterface>,
    pub users: Arc<dyn UserRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub dashboards: Arc<dyn DashboardRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub mailer: Mailer,
    pub whatsapp: Arc<dyn WhatsAppSender>,
    state: AppState,
}

impl AppContainer {
    /// Builds repositories, delivery channels and services on top of `database`.
    pub fn new(config: &AppConfig, database: Arc<dyn DatabasePoolInterface>) -> CeoResult<Self> {
        let security = Arc::new(config.security.clone());

        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(database.clone()));
        let organizations: Arc<dyn OrganizationRepository> =
            Arc::new(PgOrganizationRepository::new(database.clone()));
        let reports: Arc<dyn ReportRepository> = Arc::new(PgReportRepository::new(database.clone()));
        let dashboards: Arc<dyn DashboardRepository> =
            Arc::new(PgDashboardRepository::new(database.clone()));
        let notifications: Arc<dyn NotificationRepository> =
            Arc::new(PgNotificationRepository::new(database.clone()));

        let password_hasher: Arc<dyn PasswordHasherInterface> = Arc::new(PasswordHasher::new());
        let token_provider: Arc<dyn TokenProviderInterface> =
            Arc::new(TokenProvider::new(security.clone()));

        let mailer = Mailer::new(
            create_email_sender(&config.email)?,
            EmailTemplates::new(config.email.frontend_url.clone()),
        );
        let whatsapp = create_whatsapp_sender(&config.whatsapp)?;

        let state = AppState::new(
            Arc::new(AuthServiceImpl::new(
                users.clone(),
                password_hasher.clone(),
                token_provider.clone(),
                mailer.clone(),
                security.clone(),
            )),
            Arc::new(UserServiceImpl::new(
                users.clone(),
                password_hasher.clone(),
                token_provider.clone(),
                mailer.clone(),
            )),
            Arc::new(OrganizationServiceImpl::new(
                organizations.clone(),
                users.clone(),
                password_hasher,
                token_provider.clone(),
                mailer.clone(),
            )),
            Arc::new(ReportServiceImpl::new(reports.clone(), users.clone(), mailer.clone())),
            Arc::new(DashboardServiceImpl::new(dashboards.clone(), users.clone())),
            Arc::new(NotificationServiceImpl::new(
                notifications.clone(),
                users.clone(),
                mailer.clone(),
                whatsapp.clone(),
                security,
            )),
            database.clone(),
        );

        info!("Application container initialized");

        Ok(Self {
            database,
            token_provider,
            users,
            organizations,
            reports,
            dashboards,
            notifications,
            mailer,
            whatsapp,
            state,
        })
    }

    /// State shared by the HTTP handlers.
    pub fn app_state(&self) -> AppState {
        self.state.clone()
    }

    /// Builds the scheduler with the recurring tasks registered.
    ///
    /// Returns `None` when scheduling is disabled. The scheduler is not started.
    pub fn scheduler(&self, config: &SchedulerConfig) -> CeoResult<Option<Scheduler>> {
        if !config.enabled {
            info!("Scheduler disabled");
            return Ok(None);
        }

        let scheduler = Scheduler::new();
        scheduler
            .register(
                Arc::new(ReportReminderTask::new(
                    self.reports.clone(),
                    self.mailer.clone(),
                    self.whatsapp.clone(),
                )),
                &config.report_reminder_cron,
            )
            .map_err(|e| CeoError::Configuration(e.to_string()))?;
        scheduler
            .register(
                Arc::new(OrgMetricsTask::new(self.organizations.clone(), self.dashboards.clone())),
                &config.metrics_cron,
            )
            .map_err(|e| CeoError::Configuration(e.to_string()))?;

        Ok(Some(scheduler))
    }
}
