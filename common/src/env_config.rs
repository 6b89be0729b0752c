use std::{env, sync::Arc};

use thiserror::Error;

const DEV_JWT_SECRET: &str = "notekeeper-development-secret";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Built once at process start from environment variables and shared
/// as `Arc<Config>` with every service that needs it.
pub struct Config {
    /// `development` or `production`.
    pub environment: String,
    /// Postgres connection string. `None` selects the in-memory store,
    /// which is only accepted in development.
    pub database_url: Option<String>,
    /// Whether the Postgres connection must use TLS.
    pub database_require_ssl: bool,
    /// Configuration for JWT (JSON Web Token) authentication.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Log level name understood by `log::LevelFilter`.
    pub log_level: String,
    /// Optional file the logger also writes to.
    pub log_file: Option<String>,
    /// Google identity token verification settings.
    pub google: GoogleConfig,
    /// SMTP settings. `None` means codes are only written to the log.
    pub mail: Option<MailConfig>,
    /// Lifetime of a signup OTP in minutes.
    pub otp_ttl_minutes: i64,
    /// Timeout applied to SMTP and identity-provider calls, in seconds.
    pub external_timeout_secs: u64,
}

#[derive(Clone, Debug)]
/// Configuration for JSON Web Token (JWT) authentication.
///
/// This struct contains the secret key used to sign JWTs and
/// the expiration time in hours for issued tokens.
pub struct JwtConfig {
    /// The secret key used to sign and verify JWTs.
    pub secret: String,
    /// The expiration time for JWTs in hours.
    pub expiration_hours: i64,
}

#[derive(Clone, Debug)]
pub struct GoogleConfig {
    /// OAuth client id the ID token audience must match.
    pub client_id: String,
    /// Endpoint that validates ID tokens.
    pub tokeninfo_url: String,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Sender address, e.g. `no-reply@example.com`.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
}

impl JwtConfig {
    /// Reads the JWT configuration from environment variables:
    /// - `JWT_SECRET`: required in production; development falls back to a fixed secret.
    /// - `JWT_EXPIRATION_HOURS`: optional, defaults to 168 (7 days).
    pub fn from_env(is_production: bool) -> Result<Self, ConfigError> {
        let secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if is_production => return Err(ConfigError::Missing("JWT_SECRET")),
            _ => DEV_JWT_SECRET.to_string(),
        };

        Ok(JwtConfig {
            secret,
            expiration_hours: parse_var("JWT_EXPIRATION_HOURS", 168, "number of hours")?,
        })
    }
}

impl MailConfig {
    /// Returns `None` when `SMTP_HOST` is unset.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(smtp_host) = env::var("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(MailConfig {
            smtp_host,
            smtp_port: parse_var("SMTP_PORT", 587, "port")?,
            smtp_username: env::var("SMTP_USERNAME")
                .map_err(|_| ConfigError::Missing("SMTP_USERNAME"))?,
            smtp_password: env::var("SMTP_PASSWORD")
                .map_err(|_| ConfigError::Missing("SMTP_PASSWORD"))?,
            from_email: env::var("MAIL_FROM").map_err(|_| ConfigError::Missing("MAIL_FROM"))?,
            from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "NoteKeeper".to_string()),
        }))
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Loads `.env` first when present. Required in production:
    /// `DATABASE_URL`, `JWT_SECRET`, `GOOGLE_CLIENT_ID` and the SMTP settings.
    /// Development runs without any of them, using the in-memory store and
    /// a mail sender that only logs the code.
    pub fn from_env() -> Result<Arc<Self>, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let is_production = environment == "production";

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        if is_production && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
        if is_production && google_client_id.is_empty() {
            return Err(ConfigError::Missing("GOOGLE_CLIENT_ID"));
        }

        let mail = MailConfig::from_env()?;
        if is_production && mail.is_none() {
            return Err(ConfigError::Missing("SMTP_HOST"));
        }

        Ok(Arc::new(Config {
            jwt_config: JwtConfig::from_env(is_production)?,
            database_require_ssl: parse_bool("DATABASE_REQUIRE_SSL", is_production),
            environment,
            database_url,
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("PORT", 5000, "port")?,
            num_workers: parse_var("WORKERS", 4, "number of workers")?,
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            console_logging_enabled: parse_bool("ENABLE_CONSOLE_LOGGING", true),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_file: env::var("LOG_FILE").ok().filter(|path| !path.is_empty()),
            google: GoogleConfig {
                client_id: google_client_id,
                tokeninfo_url: env::var("GOOGLE_TOKENINFO_URL")
                    .unwrap_or_else(|_| "https://oauth2.googleapis.com/tokeninfo".to_string()),
            },
            mail,
            otp_ttl_minutes: parse_var("OTP_TTL_MINUTES", 10, "number of minutes")?,
            external_timeout_secs: parse_var("EXTERNAL_TIMEOUT_SECS", 10, "number of seconds")?,
        }))
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// True when no `JWT_SECRET` was supplied outside production.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_config.secret == DEV_JWT_SECRET
    }

    /// Configuration used by tests across the workspace.
    pub fn for_tests() -> Arc<Self> {
        Arc::new(Config {
            environment: "development".to_string(),
            database_url: None,
            database_require_ssl: false,
            jwt_config: JwtConfig {
                secret: "test-secret".to_string(),
                expiration_hours: 168,
            },
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            num_workers: 1,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            console_logging_enabled: false,
            log_level: "off".to_string(),
            log_file: None,
            google: GoogleConfig {
                client_id: "test-client-id.apps.googleusercontent.com".to_string(),
                tokeninfo_url: "http://127.0.0.1:0/tokeninfo".to_string(),
            },
            mail: None,
            otp_ttl_minutes: 10,
            external_timeout_secs: 1,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}

fn parse_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|value| value.to_lowercase() == "true")
        .unwrap_or(default)
}
