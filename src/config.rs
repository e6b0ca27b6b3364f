use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::{Deserialize, Serialize};

/// Environment variable prefix for structured overrides (`INCIDENT_SVC__DATABASE__HOST`)
pub const ENV_PREFIX: &str = "INCIDENT_SVC";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Relational store configuration
    pub database: DatabaseConfig,

    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsConfig,

    /// Outbound notification configuration
    pub notifications: NotificationConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Precedence, lowest first: embedded defaults, `CONFIG_PATH` file,
    /// `INCIDENT_SVC__*` variables, then the flat deployment variables
    /// (`DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_NAME`, `ALLOWED_ORIGINS`,
    /// `NOTIFICATION_SERVICE_URL`).
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env is the normal case outside local development
        dotenvy::dotenv().ok();

        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/local.toml".to_string());

        let builder = Self::defaults()
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            );

        Self::apply_deployment_env(builder, |key| std::env::var(key).ok())?
            .build()?
            .try_deserialize()
    }

    /// Builder seeded with the embedded default configuration
    pub fn defaults() -> ConfigBuilder<DefaultState> {
        config::Config::builder().add_source(config::File::from_str(
            include_str!("../config/default.toml"),
            config::FileFormat::Toml,
        ))
    }

    /// Layer the flat deployment variables on top of `builder`
    pub fn apply_deployment_env<F>(
        builder: ConfigBuilder<DefaultState>,
        lookup: F,
    ) -> Result<ConfigBuilder<DefaultState>, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = builder
            .set_override_option("database.user", lookup("DB_USER"))?
            .set_override_option("database.password", lookup("DB_PASSWORD"))?
            .set_override_option("database.name", lookup("DB_NAME"))?
            .set_override_option(
                "notifications.url",
                lookup("NOTIFICATION_SERVICE_URL"),
            )?
            .set_override_option(
                "cors.allowed_origins",
                lookup("ALLOWED_ORIGINS").map(|raw| split_origins(&raw)),
            )?;

        // DB_HOST may carry a port ("db:5432")
        if let Some(raw_host) = lookup("DB_HOST") {
            let (host, port) = split_host_port(&raw_host);
            builder = builder
                .set_override("database.host", host)?
                .set_override_option("database.port", port.map(i64::from))?;
        }

        Ok(builder)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Storage backend type
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Database name
    #[serde(default)]
    pub name: String,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Create the incidents table on startup if it does not exist
    #[serde(default = "default_true")]
    pub init_schema: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to make credentialed cross-origin requests; `*` mirrors any origin
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Enable outbound notifications for high-severity incidents
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Destination endpoint
    #[serde(default = "default_notification_url")]
    pub url: String,

    /// Per-request time budget (seconds)
    #[serde(default = "default_notification_timeout")]
    pub timeout_secs: u64,

    /// Value sent as `source_service` in every payload
    #[serde(default = "default_source_service")]
    pub source_service: String,

    /// Notification queue size
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Number of delivery workers
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_notification_url(),
            timeout_secs: default_notification_timeout(),
            source_service: default_source_service(),
            queue_size: default_queue_size(),
            workers: default_workers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

/// Split a comma-separated origin list, dropping blanks
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_host_port(raw: &str) -> (String, Option<u16>) {
    match raw.rsplit_once(':') {
        Some((host, port)) => match port.parse::<u16>() {
            Ok(port) => (host.to_string(), Some(port)),
            Err(_) => (raw.to_string(), None),
        },
        None => (raw.to_string(), None),
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    10
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_notification_url() -> String {
    "http://notification-service:8001/notify".to_string()
}

fn default_notification_timeout() -> u64 {
    5
}

fn default_source_service() -> String {
    "incident-service".to_string()
}

fn default_queue_size() -> usize {
    1024
}

fn default_workers() -> usize {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
