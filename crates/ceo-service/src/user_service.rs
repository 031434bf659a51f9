//! User service implementation.

use crate::auth_service::subject_for;
use crate::dto::{CreateUserRequest, CreateUserResponse, UserListResponse, UserResponse};
use crate::Mailer;
use ceo_core::{CeoError, CeoResult, Interface, NewUser, PageRequest, UserId, ValidateExt};
use ceo_repository::UserRepository;
use ceo_security::{
    generate_token, Claims, ClaimsExt, PasswordHasherInterface, TokenProviderInterface,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// User service trait.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Creates a standalone account with a primary role.
    async fn create_user(&self, request: CreateUserRequest) -> CeoResult<CreateUserResponse>;

    /// Lists the members of the caller's organization.
    async fn list_members(&self, claims: &Claims, page: PageRequest) -> CeoResult<UserListResponse>;

    /// Gets a member of the caller's organization.
    async fn get_member(&self, claims: &Claims, id: UserId) -> CeoResult<UserResponse>;
}

/// User service implementation.
pub struct UserServiceImpl {
    users: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasherInterface>,
    token_provider: Arc<dyn TokenProviderInterface>,
    mailer: Mailer,
}

impl UserServiceImpl {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasherInterface>,
        token_provider: Arc<dyn TokenProviderInterface>,
        mailer: Mailer,
    ) -> Self {
        Self {
            users,
            password_hasher,
            token_provider,
            mailer,
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn create_user(&self, request: CreateUserRequest) -> CeoResult<CreateUserResponse> {
        debug!("Creating user: {}", request.email);

        request.validate_request()?;

        if self.users.exists_by_email(&request.email).await? {
            return Err(CeoError::conflict("Email already registered"));
        }

        let password_hash = request
            .password
            .as_deref()
            .map(|password| self.password_hasher.hash(password))
            .transpose()?;
        let verification_token = generate_token();

        let user = self
            .users
            .create(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                role: Some(request.role),
                org_id: None,
                active: true,
                verification_token: Some(verification_token.clone()),
                invitation_token: None,
            })
            .await?;

        info!(user_id = %user.id, role = %request.role, "User created");

        let issued = self
            .token_provider
            .generate_token(&subject_for(&user, vec![request.role]))?;

        let message = self.mailer.templates().verification(&verification_token);
        self.mailer.send(&user.email, message).await;

        Ok(CreateUserResponse {
            message: "User registered successfully".to_string(),
            user: UserResponse::from(user),
            token: issued.token,
        })
    }

    async fn list_members(&self, claims: &Claims, page: PageRequest) -> CeoResult<UserListResponse> {
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, "Listing members, page: {}, limit: {}", page.page, page.limit);

        let members = self.users.list_members(org_id, page).await?;
        Ok(UserListResponse {
            users: members.items.into_iter().map(UserResponse::from).collect(),
            pagination: members.pagination,
        })
    }

    async fn get_member(&self, claims: &Claims, id: UserId) -> CeoResult<UserResponse> {
        let org_id = claims.require_org()?;

        self.users
            .find_member(id, org_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| CeoError::not_found("User", id))
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{claims, hash, password_hasher, token_provider, MemoryStore, RecordingEmail};
    use ceo_core::RoleName;
    use ceo_notify::EmailTemplates;

    fn service(store: &Arc<MemoryStore>, email: &Arc<RecordingEmail>) -> UserServiceImpl {
        UserServiceImpl::new(
            store.clone(),
            password_hasher(),
            token_provider(),
            Mailer::new(email.clone(), EmailTemplates::new("http://app.test")),
        )
    }

    fn create_request(email: &str, password: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            name: "Kofi".to_string(),
            email: email.to_string(),
            password: password.map(ToString::to_string),
            role: RoleName::Finance,
        }
    }

    #[tokio::test]
    async fn test_create_user_with_primary_role() {
        let store = MemoryStore::new();
        let email = Arc::new(RecordingEmail::default());
        let service = service(&store, &email);

        let response = service
            .create_user(create_request("kofi@example.com", Some("secret1")))
            .await
            .unwrap();

        assert_eq!(response.user.role, Some(RoleName::Finance));
        assert_eq!(response.user.roles, vec![RoleName::Finance]);
        assert!(response.user.org_id.is_none());

        let claims = token_provider().validate_token(&response.token).unwrap();
        assert_eq!(claims.roles, vec![RoleName::Finance]);

        assert_eq!(email.recipients(), vec!["kofi@example.com".to_string()]);
        assert!(store.user(response.user.id).unwrap().password_hash.is_some());
    }

    #[tokio::test]
    async fn test_create_user_without_password() {
        let store = MemoryStore::new();
        let email = Arc::new(RecordingEmail::default());
        let service = service(&store, &email);

        let response = service
            .create_user(create_request("nopass@example.com", None))
            .await
            .unwrap();
        assert!(store.user(response.user.id).unwrap().password_hash.is_none());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let store = MemoryStore::new();
        let email = Arc::new(RecordingEmail::default());
        let service = service(&store, &email);
        store.seed_user("Taken", "taken@example.com", &hash("secret1"), None);

        let err = service
            .create_user(create_request("taken@example.com", Some("secret1")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_members_are_scoped_to_caller_org() {
        let store = MemoryStore::new();
        let email = Arc::new(RecordingEmail::default());
        let service = service(&store, &email);

        let acme = store.seed_org("Acme");
        let globex = store.seed_org("Globex");
        let ceo = store.seed_user("Ceo", "ceo@acme.test", "h", Some(acme));
        store.grant(ceo.id, RoleName::Ceo, acme);
        let peer = store.seed_user("Peer", "peer@acme.test", "h", Some(acme));
        let outsider = store.seed_user("Out", "out@globex.test", "h", Some(globex));

        let caller = claims(ceo.id, Some(acme), vec![RoleName::Ceo]);
        let page = service.list_members(&caller, PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert!(page.users.iter().all(|u| u.org_id == Some(acme)));
        let listed_ceo = page.users.iter().find(|u| u.id == ceo.id).unwrap();
        assert_eq!(listed_ceo.roles, vec![RoleName::Ceo]);

        assert_eq!(service.get_member(&caller, peer.id).await.unwrap().id, peer.id);

        let err = service.get_member(&caller, outsider.id).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_members_require_an_org() {
        let store = MemoryStore::new();
        let email = Arc::new(RecordingEmail::default());
        let service = service(&store, &email);

        let err = service
            .list_members(&claims(UserId(1), None, vec![]), PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
