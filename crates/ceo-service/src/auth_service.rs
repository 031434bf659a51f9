//! Authentication service implementation.

use crate::dto::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    ResetPasswordRequest, UserResponse,
};
use crate::{expires_after, Mailer};
use ceo_config::SecurityConfig;
use ceo_core::{CeoError, CeoResult, Interface, NewUser, RoleName, User, ValidateExt};
use ceo_repository::UserRepository;
use ceo_security::{
    generate_token, Claims, PasswordHasherInterface, TokenProviderInterface, TokenSubject,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Interface + Send + Sync {
    /// Registers an account and mails a verification link.
    async fn register(&self, request: RegisterRequest) -> CeoResult<MessageResponse>;

    /// Logs in a user.
    async fn login(&self, request: LoginRequest) -> CeoResult<LoginResponse>;

    /// Consumes an email verification token.
    async fn verify_email(&self, token: &str) -> CeoResult<MessageResponse>;

    /// Mails a password reset link.
    async fn forgot_password(&self, request: ForgotPasswordRequest) -> CeoResult<MessageResponse>;

    /// Sets a new password using a reset token.
    async fn reset_password(&self, request: ResetPasswordRequest) -> CeoResult<MessageResponse>;

    /// Gets the current user from claims.
    async fn current_user(&self, claims: &Claims) -> CeoResult<UserResponse>;
}

/// Roles a token should carry for the user.
///
/// Organization members get their `user_roles`; standalone accounts get
/// their primary role.
pub(crate) async fn roles_for(users: &dyn UserRepository, user: &User) -> CeoResult<Vec<RoleName>> {
    match user.org_id {
        Some(org_id) => users.find_roles(user.id, org_id).await,
        None => Ok(user.role.into_iter().collect()),
    }
}

/// Token subject for a user and the roles they hold.
pub(crate) fn subject_for(user: &User, roles: Vec<RoleName>) -> TokenSubject {
    TokenSubject {
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        org_id: user.org_id,
        roles,
    }
}

/// Authentication service implementation.
pub struct AuthServiceImpl {
    users: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasherInterface>,
    token_provider: Arc<dyn TokenProviderInterface>,
    mailer: Mailer,
    config: Arc<SecurityConfig>,
}

impl AuthServiceImpl {
    /// Creates a new authentication service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasherInterface>,
        token_provider: Arc<dyn TokenProviderInterface>,
        mailer: Mailer,
        config: Arc<SecurityConfig>,
    ) -> Self {
        Self {
            users,
            password_hasher,
            token_provider,
            mailer,
            config,
        }
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: RegisterRequest) -> CeoResult<MessageResponse> {
        debug!("Registering user: {}", request.email);

        request.validate_request()?;

        if self.users.exists_by_email(&request.email).await? {
            return Err(CeoError::conflict("User already exists"));
        }

        let password_hash = self.password_hasher.hash(&request.password)?;
        let verification_token = generate_token();

        let user = self
            .users
            .create(NewUser {
                name: request.name,
                email: request.email,
                password_hash: Some(password_hash),
                role: None,
                org_id: None,
                active: true,
                verification_token: Some(verification_token.clone()),
                invitation_token: None,
            })
            .await?;

        info!(user_id = %user.id, "User registered");

        let message = self.mailer.templates().verification(&verification_token);
        self.mailer.send(&user.email, message).await;

        Ok(MessageResponse::new(
            "Registration successful. Please check your email to verify your account.",
        ))
    }

    async fn login(&self, request: LoginRequest) -> CeoResult<LoginResponse> {
        debug!("Login attempt for: {}", request.email);

        request.validate_request()?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(CeoError::InvalidCredentials)?;

        // Invited members have no password until they accept
        let Some(password_hash) = user.password_hash.as_deref() else {
            if !user.active {
                return Err(CeoError::forbidden("Please accept your invitation first"));
            }
            return Err(CeoError::InvalidCredentials);
        };
        if !self.password_hasher.verify(&request.password, password_hash)? {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(CeoError::InvalidCredentials);
        }

        if !user.is_verified {
            return Err(CeoError::validation("Please verify your email first"));
        }
        if !user.active {
            return Err(CeoError::forbidden("Account is not active"));
        }

        let roles = roles_for(self.users.as_ref(), &user).await?;
        let issued = self.token_provider.generate_token(&subject_for(&user, roles.clone()))?;

        self.users.record_login(user.id).await?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            roles,
            org_id: user.org_id,
            token: issued.token,
        })
    }

    async fn verify_email(&self, token: &str) -> CeoResult<MessageResponse> {
        debug!("Verifying email token");

        let user = self
            .users
            .verify_email(token)
            .await?
            .ok_or_else(|| CeoError::validation("Invalid verification token"))?;

        info!(user_id = %user.id, "Email verified");

        let message = self.mailer.templates().welcome(&user.name);
        self.mailer.send(&user.email, message).await;

        Ok(MessageResponse::new("Email verified successfully. You can now log in."))
    }

    async fn forgot_password(&self, request: ForgotPasswordRequest) -> CeoResult<MessageResponse> {
        debug!("Password reset requested for: {}", request.email);

        request.validate_request()?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| CeoError::not_found("User", &request.email))?;

        let token = generate_token();
        let expires_at = expires_after(self.config.reset_token_ttl())?;
        self.users.set_reset_token(user.id, &token, expires_at).await?;

        let message = self.mailer.templates().password_reset(&token);
        self.mailer.send(&user.email, message).await;

        Ok(MessageResponse::new("Password reset email sent"))
    }

    async fn reset_password(&self, request: ResetPasswordRequest) -> CeoResult<MessageResponse> {
        debug!("Resetting password");

        request.validate_request()?;

        let password_hash = self.password_hasher.hash(&request.password)?;
        if !self
            .users
            .reset_password(&request.token, &password_hash, Utc::now())
            .await?
        {
            return Err(CeoError::validation("Invalid or expired reset token"));
        }

        info!("Password reset completed");
        Ok(MessageResponse::new("Password reset successful"))
    }

    async fn current_user(&self, claims: &Claims) -> CeoResult<UserResponse> {
        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| CeoError::not_found("User", claims.user_id))?;

        let roles = roles_for(self.users.as_ref(), &user).await?;
        Ok(UserResponse::with_roles(user, roles))
    }
}

impl std::fmt::Debug for AuthServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServiceImpl").finish_non_exhaustive()
    }
}
