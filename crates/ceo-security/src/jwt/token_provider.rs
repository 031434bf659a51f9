//! JWT token provider for creating and validating tokens.

use super::{Claims, TokenSubject};
use ceo_config::SecurityConfig;
use ceo_core::{CeoError, CeoResult, Interface};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, warn};

/// A signed token with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Interface for issuing and checking bearer tokens.
pub trait TokenProviderInterface: Interface + Send + Sync {
    /// Issues a token for the subject.
    fn generate_token(&self, subject: &TokenSubject) -> CeoResult<IssuedToken>;

    /// Validates a token and returns its claims.
    fn validate_token(&self, token: &str) -> CeoResult<Claims>;
}

/// JWT token provider service.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: Arc<SecurityConfig>,
    validation: Validation,
}

impl TokenProvider {
    /// Creates a new token provider.
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            encoding_key,
            decoding_key,
            config,
            validation,
        }
    }

    fn expiration(&self) -> Duration {
        Duration::seconds(i64::try_from(self.config.jwt_expiration_secs).unwrap_or(i64::MAX / 1000))
    }
}

impl TokenProviderInterface for TokenProvider {
    fn generate_token(&self, subject: &TokenSubject) -> CeoResult<IssuedToken> {
        let expires_at = Utc::now() + self.expiration();

        let claims = Claims::new(
            subject,
            self.config.jwt_issuer.clone(),
            self.config.jwt_audience.clone(),
            expires_at,
        );

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| CeoError::Internal(format!("Failed to generate token: {e}")))?;

        debug!("Generated token for user {}", subject.user_id);
        Ok(IssuedToken { token, expires_at })
    }

    fn validate_token(&self, token: &str) -> CeoResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!("Token validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => CeoError::TokenExpired,
                    ErrorKind::InvalidToken | ErrorKind::InvalidSignature => {
                        CeoError::InvalidToken("Invalid token signature".to_string())
                    }
                    ErrorKind::InvalidIssuer => {
                        CeoError::InvalidToken("Invalid token issuer".to_string())
                    }
                    ErrorKind::InvalidAudience => {
                        CeoError::InvalidToken("Invalid token audience".to_string())
                    }
                    _ => CeoError::InvalidToken(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .finish_non_exhaustive()
    }
}
