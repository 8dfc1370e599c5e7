use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub recurrence: RecurrenceConfig,
    pub intake: IntakeConfig,
    pub logging: LoggingConfig,
}

/// Roles a bearer token can carry. Each role inherits the permissions of the
/// one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiToken {
    /// Lowercase hex SHA-256 digest of the bearer token.
    pub token_sha256: String,
    pub subject: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: Vec<ApiToken>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allow_origin: String,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    /// Generation horizon used when neither `generate_until` nor an end date bounds a series.
    pub default_horizon_days: u32,
    pub max_page_size: usize,
    /// Widest date window a listing or `generate_until` may span.
    pub max_window_days: u32,
    pub next_occurrences_preview: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    pub cache_ttl_seconds: i64,
    pub historical_boost: f64,
    pub user_hint_boost: f64,
    pub max_similar_tickets: usize,
    pub similarity_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, environment variables, and an optional
    /// `config.toml`. Environment variables use the `DOSSIER` prefix and `__` as
    /// the nesting separator, e.g. `DOSSIER_SERVER__PORT=9000`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::builder()?
            .add_source(config::File::with_name("config.toml").required(false))
            .add_source(
                config::Environment::with_prefix("DOSSIER")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Loads configuration from defaults overlaid with a TOML document.
    ///
    /// ## Errors
    /// Returns an error if the TOML is malformed or does not deserialize.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(Self::builder()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8700)?
            .set_default("server.cors_allow_origin", "*")?
            .set_default("recurrence.default_horizon_days", 365)?
            .set_default("recurrence.max_page_size", 1000)?
            .set_default("recurrence.max_window_days", 3660)?
            .set_default("recurrence.next_occurrences_preview", 10)?
            .set_default("intake.cache_ttl_seconds", 3600)?
            .set_default("intake.historical_boost", 0.3)?
            .set_default("intake.user_hint_boost", 0.5)?
            .set_default("intake.max_similar_tickets", 5)?
            .set_default("intake.similarity_threshold", 0.3)?
            .set_default("logging.level", "info")?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    Settings::load()
}
