//! Notification controller.

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, PaginationQuery, ValidatedJson},
    responses::{ok, ApiResult},
    state::AppState,
};
use ceo_core::{ErrorResponse, Notification, NotificationId, NotificationPreferences, PreferencesUpdate};
use ceo_service::{
    ConfirmWhatsAppRequest, MessageResponse, NotificationFilter, NotificationListResponse,
    SendNotificationRequest, SendNotificationResponse, VerifyWhatsAppRequest,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::debug;

/// Creates the notification router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send", post(send))
        .route("/", get(list))
        .route("/unread", get(unread))
        .route("/:id/read", put(mark_read))
        .route("/preferences", put(update_preferences))
        .route("/verify-whatsapp", post(verify_whatsapp))
        .route("/confirm-whatsapp", post(confirm_whatsapp))
}

/// Broadcast a notification over the requested channels. CEO or project manager.
#[utoipa::path(
    post,
    path = "/api/notifications/send",
    tag = "notifications",
    security(("bearer_auth" = [])),
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification sent", body = SendNotificationResponse),
        (status = 403, description = "Caller cannot broadcast", body = ErrorResponse)
    )
)]
pub async fn send(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<SendNotificationRequest>,
) -> ApiResult<SendNotificationResponse> {
    debug!("Send notification request from {}: {}", user.user_id, request.title);

    let response = state.notification_service.send(&user.0, request).await?;
    ok(response)
}

/// The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<u32>, Query, description = "Page size"),
        ("unread_only" = Option<bool>, Query, description = "Only unread notifications")
    ),
    responses(
        (status = 200, description = "Notifications", body = NotificationListResponse)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<NotificationFilter>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<NotificationListResponse> {
    debug!("List notifications request from: {}", user.user_id);

    let response = state
        .notification_service
        .list(&user.0, filter, pagination.into())
        .await?;
    ok(response)
}

/// Every unread notification of the caller.
#[utoipa::path(
    get,
    path = "/api/notifications/unread",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread notifications", body = [Notification])
    )
)]
pub async fn unread(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Vec<Notification>> {
    debug!("Unread notifications request from: {}", user.user_id);

    let notifications = state.notification_service.unread(&user.0).await?;
    ok(notifications)
}

/// Mark one of the caller's notifications as read.
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read", body = MessageResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    debug!("Mark notification {} read for {}", id, user.user_id);

    let id: NotificationId = parse_id("notification", &id)?;
    let response = state.notification_service.mark_read(&user.0, id).await?;
    ok(response)
}

/// Update channel opt-ins; omitted channels keep their value.
#[utoipa::path(
    put,
    path = "/api/notifications/preferences",
    tag = "notifications",
    security(("bearer_auth" = [])),
    request_body = PreferencesUpdate,
    responses(
        (status = 200, description = "Stored preferences", body = NotificationPreferences)
    )
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(update): Json<PreferencesUpdate>,
) -> ApiResult<NotificationPreferences> {
    debug!("Preferences update for {}: {:?}", user.user_id, update);

    let preferences = state
        .notification_service
        .update_preferences(&user.0, update)
        .await?;
    ok(preferences)
}

/// Send a verification code to a WhatsApp number.
#[utoipa::path(
    post,
    path = "/api/notifications/verify-whatsapp",
    tag = "notifications",
    security(("bearer_auth" = [])),
    request_body = VerifyWhatsAppRequest,
    responses(
        (status = 200, description = "Code sent", body = MessageResponse),
        (status = 400, description = "Invalid phone number", body = ErrorResponse),
        (status = 502, description = "WhatsApp delivery failed", body = ErrorResponse)
    )
)]
pub async fn verify_whatsapp(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<VerifyWhatsAppRequest>,
) -> ApiResult<MessageResponse> {
    debug!("WhatsApp verification request from: {}", user.user_id);

    let response = state
        .notification_service
        .start_whatsapp_verification(&user.0, request)
        .await?;
    ok(response)
}

/// Confirm the pending WhatsApp number with the received code.
#[utoipa::path(
    post,
    path = "/api/notifications/confirm-whatsapp",
    tag = "notifications",
    security(("bearer_auth" = [])),
    request_body = ConfirmWhatsAppRequest,
    responses(
        (status = 200, description = "Number verified", body = MessageResponse),
        (status = 400, description = "Invalid or expired verification code", body = ErrorResponse)
    )
)]
pub async fn confirm_whatsapp(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<ConfirmWhatsAppRequest>,
) -> ApiResult<MessageResponse> {
    debug!("WhatsApp confirmation from: {}", user.user_id);

    let response = state.notification_service.confirm_whatsapp(&user.0, request).await?;
    ok(response)
}
