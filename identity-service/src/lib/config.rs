use std::env;
use std::time::Duration as StdDuration;

use auth::Algorithm;
use auth::Authenticator;
use auth::JwtHandler;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// `database.url` value that selects the in-process store instead of Postgres.
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime, e.g. `24h`, `90m`, `1h30m`
    #[serde(default = "default_expiry")]
    pub expiry: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

fn default_max_connections() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_expiry() -> String {
    "24h".to_string()
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, JWT__EXPIRY, DATABASE__URL, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// The result is validated, so a missing secret or an unusable token
    /// lifetime fails here rather than on the first request.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Check the values that cannot be expressed in the schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.token_ttl()?;
        self.jwt.signing_algorithm()?;

        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".to_string()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "server.request_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.request_timeout_secs)
    }
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

impl JwtConfig {
    pub fn token_ttl(&self) -> Result<Duration, ConfigError> {
        auth::parse_ttl(&self.expiry)
            .map_err(|e| ConfigError::Message(format!("jwt.expiry '{}': {}", self.expiry, e)))
    }

    pub fn signing_algorithm(&self) -> Result<Algorithm, ConfigError> {
        let algorithm: Algorithm = self.algorithm.parse().map_err(|_| {
            ConfigError::Message(format!("jwt.algorithm '{}' is unknown", self.algorithm))
        })?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            _ => Err(ConfigError::Message(format!(
                "jwt.algorithm '{}' is not an HMAC algorithm",
                self.algorithm
            ))),
        }
    }

    /// Build the process-wide authenticator from this section.
    pub fn authenticator(&self) -> Result<Authenticator, ConfigError> {
        let handler = JwtHandler::new(self.secret.as_bytes())
            .with_algorithm(self.signing_algorithm()?)
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(Authenticator::new(handler, self.token_ttl()?))
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("expiry", &self.expiry)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
