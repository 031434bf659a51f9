//! Configuration loader with layered sources.

use crate::{AppConfig, DEFAULT_JWT_SECRET};
use ceo_core::CeoError;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Minimum JWT secret length accepted in production.
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Conventional variable names honoured alongside the `CEO__` prefix.
const ENV_ALIASES: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("JWT_SECRET", "security.jwt_secret"),
    ("FRONTEND_URL", "email.frontend_url"),
    ("TWILIO_ACCOUNT_SID", "whatsapp.account_sid"),
    ("TWILIO_AUTH_TOKEN", "whatsapp.auth_token"),
    ("TWILIO_WHATSAPP_NUMBER", "whatsapp.from_number"),
];

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{APP_ENV}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with the `CEO__` prefix, e.g. `CEO__SERVER__PORT`
    /// 5. Conventional names such as `DATABASE_URL` and `JWT_SECRET`
    pub fn new(config_dir: impl Into<String>) -> Result<Self, CeoError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, CeoError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), CeoError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, CeoError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{config_dir}/{name}.toml");
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder
            .add_source(
                Environment::with_prefix("CEO")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())
            .map_err(config_error_to_ceo_error)?;

        for (var, key) in ENV_ALIASES {
            builder = builder
                .set_override_option(*key, std::env::var(var).ok())
                .map_err(config_error_to_ceo_error)?;
        }

        let app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error_to_ceo_error)?;

        validate_config(&app_config)?;

        Ok(app_config)
    }
}

/// Rejects configurations the server cannot run with.
pub fn validate_config(config: &AppConfig) -> Result<(), CeoError> {
    if config.database.url.is_empty() {
        return Err(CeoError::Configuration("Database URL is required".to_string()));
    }

    if config.server.port == 0 {
        return Err(CeoError::Configuration("Server port must not be 0".to_string()));
    }

    if config.app.is_production() {
        if config.security.jwt_secret == DEFAULT_JWT_SECRET
            || config.security.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(CeoError::Configuration(format!(
                "JWT secret must be at least {MIN_PRODUCTION_SECRET_LEN} characters in production"
            )));
        }
    } else if config.security.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using the default JWT secret; set JWT_SECRET before deploying");
    }

    if config.whatsapp.enabled && !config.whatsapp.has_credentials() {
        return Err(CeoError::Configuration(
            "WhatsApp is enabled but Twilio credentials are missing".to_string(),
        ));
    }

    if config.email.enabled && config.email.smtp_host.is_empty() {
        return Err(CeoError::Configuration(
            "Email is enabled but no SMTP host is configured".to_string(),
        ));
    }

    Ok(())
}

fn config_error_to_ceo_error(err: ConfigError) -> CeoError {
    CeoError::Configuration(err.to_string())
}
