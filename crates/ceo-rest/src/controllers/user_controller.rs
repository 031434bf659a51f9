//! User management controller.

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, PaginationQuery, ValidatedJson},
    responses::{created, ok, ApiResult, CreatedResult},
    state::AppState,
};
use ceo_core::{ErrorResponse, UserId};
use ceo_service::{
    CreateUserRequest, CreateUserResponse, LoginRequest, LoginResponse, UserListResponse,
    UserResponse,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use tracing::debug;

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/", get(list_users))
        .route("/:id", get(get_user))
}

/// Create a standalone account with a primary role.
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = CreateUserResponse),
        (status = 400, description = "Invalid input or email taken", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> CreatedResult<CreateUserResponse> {
    debug!("User registration request: {} as {}", request.email, request.role);

    let response = state.user_service.create_user(request).await?;
    created(response)
}

/// Login with email and password.
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    debug!("Login request for: {}", request.email);

    let response = state.auth_service.login(request).await?;
    ok(response)
}

/// List members of the caller's organization.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Members", body = UserListResponse),
        (status = 403, description = "Caller has no organization", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<UserListResponse> {
    debug!("List users request from: {}", user.user_id);

    let response = state.user_service.list_members(&user.0, pagination.into()).await?;
    ok(response)
}

/// Get a member of the caller's organization.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Member", body = UserResponse),
        (status = 404, description = "Not a member of the organization", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<UserResponse> {
    debug!("Get user request: {}", id);

    let id: UserId = parse_id("user", &id)?;
    let response = state.user_service.get_member(&user.0, id).await?;
    ok(response)
}
