use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::identity::{VerifierConfig, GOOGLE_ISSUERS, GOOGLE_JWKS_URL};
use crate::infrastructure::storage::StorageType;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Identity provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// OAuth client id; ID tokens must carry it as `aud`
    pub client_id: String,
    pub issuers: Vec<String>,
    pub jwks_url: String,
    /// Inline JWKS document, used instead of fetching `jwks_url`
    pub jwks_json: Option<String>,
    pub jwks_cache_ttl_secs: u64,
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres` or `memory`
    pub backend: String,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            cors_origins: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            issuers: GOOGLE_ISSUERS.iter().map(|s| s.to_string()).collect(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            jwks_json: None,
            jwks_cache_ttl_secs: 3600,
            leeway_secs: 60,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: "postgres".to_string(),
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl AuthConfig {
    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig::new(self.client_id.clone())
            .with_issuers(self.issuers.clone())
            .with_leeway(self.leeway_secs)
    }
}

impl DatabaseConfig {
    pub fn storage_type(&self) -> Result<StorageType, DomainError> {
        StorageType::parse(&self.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown storage backend: {}", self.backend))
        })
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, DomainError> {
        let mut app_config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("auth.issuers")
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize::<Self>())
            .map_err(|e| DomainError::configuration(format!("Failed to load config: {}", e)))?;

        app_config.apply_overrides(|name| std::env::var(name).ok())?;

        Ok(app_config)
    }

    /// Apply the conventional deployment variables on top of layered config
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), DomainError> {
        if let Some(client_id) = lookup("GOOGLE_CLIENT_ID").filter(|v| !v.is_empty()) {
            self.auth.client_id = client_id;
        }

        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = url;
        }

        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            self.server.port = port.trim().parse().map_err(|_| {
                DomainError::configuration(format!("PORT is not a valid port number: {}", port))
            })?;
        }

        Ok(())
    }

    /// Check that everything needed to serve requests is present
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.auth.client_id.trim().is_empty() {
            return Err(DomainError::configuration(
                "Identity client id is not configured (set GOOGLE_CLIENT_ID)",
            ));
        }

        self.validate_database()
    }

    /// Check the storage settings alone
    pub fn validate_database(&self) -> Result<(), DomainError> {
        if self.database.storage_type()? == StorageType::Postgres
            && self.database.url.trim().is_empty()
        {
            return Err(DomainError::configuration(
                "Database URL is not configured (set DATABASE_URL)",
            ));
        }

        Ok(())
    }
}
