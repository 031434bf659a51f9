//! OpenAPI documentation configuration.

use crate::controllers::health_controller::{HealthResponse, ReadinessResponse};
use ceo_core::{
    ActivityItem, Channel, DashboardOverview, DeliveryAttempt, DeliveryStatus, ErrorResponse,
    FieldError, HourlyActivity, Notification, NotificationPreferences, OrgId, Organization,
    PageInfo, PerformanceStats, PreferencesUpdate, ReportComment, ReportFrequency, ReportStats,
    ReportStatus, ReportSummary, ReportTemplate, RoleName, SubmittedReport, TeamMemberStats,
    TeamOverview, TemplateDistribution, TemplateId, TimelinePoint, TrendPoint, UserId,
    UserPerformance, UserStats,
};
use ceo_service::{
    AcceptInvitationRequest, ActivityResponse, AddCommentRequest, ConfirmWhatsAppRequest,
    CreateTemplateRequest, CreateUserRequest, CreateUserResponse, ForgotPasswordRequest,
    InviteMemberRequest, InviteMemberResponse, LoginRequest, LoginResponse, MemberSummary,
    MessageResponse, NotificationListResponse, OrganizationResponse, OrganizationSummary,
    RecipientDelivery, RegisterOrganizationRequest, RegisterOrganizationResponse,
    RegisterRequest, ReportDetailResponse, ReportListResponse, ResetPasswordRequest,
    ReviewReportRequest, SendNotificationRequest, SendNotificationResponse, SubmitReportRequest,
    UserListResponse, UserResponse, VerifyWhatsAppRequest,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the CEO platform API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CEO Platform API",
        version = "1.0.0",
        description = "Organization management: members, periodic reports, dashboards and notifications"
    ),
    paths(
        crate::controllers::auth_controller::register,
        crate::controllers::auth_controller::login,
        crate::controllers::auth_controller::verify_email,
        crate::controllers::auth_controller::forgot_password,
        crate::controllers::auth_controller::reset_password,
        crate::controllers::auth_controller::get_current_user,
        crate::controllers::user_controller::register,
        crate::controllers::user_controller::login,
        crate::controllers::user_controller::list_users,
        crate::controllers::user_controller::get_user,
        crate::controllers::organization_controller::register,
        crate::controllers::organization_controller::invite,
        crate::controllers::organization_controller::accept_invitation,
        crate::controllers::organization_controller::current,
        crate::controllers::report_controller::create_template,
        crate::controllers::report_controller::list_templates,
        crate::controllers::report_controller::submit_report,
        crate::controllers::report_controller::list_reports,
        crate::controllers::report_controller::get_report,
        crate::controllers::report_controller::review_report,
        crate::controllers::report_controller::add_comment,
        crate::controllers::dashboard_controller::overview,
        crate::controllers::dashboard_controller::activity,
        crate::controllers::dashboard_controller::performance,
        crate::controllers::dashboard_controller::team,
        crate::controllers::notification_controller::send,
        crate::controllers::notification_controller::list,
        crate::controllers::notification_controller::unread,
        crate::controllers::notification_controller::mark_read,
        crate::controllers::notification_controller::update_preferences,
        crate::controllers::notification_controller::verify_whatsapp,
        crate::controllers::notification_controller::confirm_whatsapp,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            // Core types
            UserId,
            OrgId,
            TemplateId,
            RoleName,
            ErrorResponse,
            FieldError,
            PageInfo,
            Organization,
            ReportFrequency,
            ReportStatus,
            ReportTemplate,
            SubmittedReport,
            ReportSummary,
            ReportComment,
            Channel,
            DeliveryStatus,
            DeliveryAttempt,
            Notification,
            NotificationPreferences,
            PreferencesUpdate,
            DashboardOverview,
            UserStats,
            ReportStats,
            TrendPoint,
            ActivityItem,
            UserPerformance,
            PerformanceStats,
            TimelinePoint,
            TemplateDistribution,
            TeamOverview,
            TeamMemberStats,
            HourlyActivity,
            HealthResponse,
            ReadinessResponse,
            // Request and response DTOs
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            MessageResponse,
            CreateUserRequest,
            CreateUserResponse,
            UserResponse,
            UserListResponse,
            RegisterOrganizationRequest,
            RegisterOrganizationResponse,
            OrganizationSummary,
            MemberSummary,
            InviteMemberRequest,
            InviteMemberResponse,
            AcceptInvitationRequest,
            OrganizationResponse,
            CreateTemplateRequest,
            SubmitReportRequest,
            ReviewReportRequest,
            AddCommentRequest,
            ReportListResponse,
            ReportDetailResponse,
            ActivityResponse,
            SendNotificationRequest,
            SendNotificationResponse,
            RecipientDelivery,
            NotificationListResponse,
            VerifyWhatsAppRequest,
            ConfirmWhatsAppRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Accounts and organization members"),
        (name = "organizations", description = "Organizations and invitations"),
        (name = "reports", description = "Report templates, submissions and reviews"),
        (name = "dashboard", description = "Organization and member statistics"),
        (name = "notifications", description = "Broadcasts, inbox and channel settings"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Security addon for JWT Bearer authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token authentication"))
                        .build(),
                ),
            );
        }
    }
}
