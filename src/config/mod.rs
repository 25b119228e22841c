use chrono::FixedOffset;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

use crate::database::models::TodayWindow;

/// Signing secret used when `JWT_SECRET` is not set. Refused in production.
pub const DEV_JWT_SECRET: &str = "agrobagual-dev-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub weather: WeatherConfig,
    pub assistant: AssistantConfig,
    pub reminders: RemindersConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Absent means the in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub country_code: String,
    pub lang: String,
    /// Local offset used to pick each forecast day's noon reading
    pub utc_offset_hours: i32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub chat_max_tokens: u32,
    pub vision_max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    pub today_window: TodayWindow,
    /// Offset the calendar-day window is measured in (Brasília is -3)
    pub utc_offset_hours: i32,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            today_window: TodayWindow::AllPending,
            utc_offset_hours: -3,
        }
    }
}

impl RemindersConfig {
    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours.checked_mul(3600)?)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in production")]
    DevSecretInProduction,

    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("REMINDERS_UTC_OFFSET_HOURS out of range: {0}")]
    InvalidUtcOffset(i32),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout =
                v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Some(port) = env::var("AGRO_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_MAX_UPLOAD_BYTES") {
            self.api.max_upload_bytes = v.parse().unwrap_or(self.api.max_upload_bytes);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Weather overrides
        if let Some(key) = env::var("WEATHER_API_KEY")
            .ok()
            .or_else(|| env::var("OPENWEATHER_API_KEY").ok())
            .filter(|s| !s.trim().is_empty())
        {
            self.weather.api_key = Some(key);
        }
        if let Ok(v) = env::var("WEATHER_BASE_URL") {
            self.weather.base_url = v;
        }
        if let Ok(v) = env::var("WEATHER_COUNTRY_CODE") {
            self.weather.country_code = v;
        }
        if let Ok(v) = env::var("WEATHER_UTC_OFFSET_HOURS") {
            self.weather.utc_offset_hours = v.parse().unwrap_or(self.weather.utc_offset_hours);
        }
        if let Ok(v) = env::var("WEATHER_TIMEOUT_SECS") {
            self.weather.timeout_secs = v.parse().unwrap_or(self.weather.timeout_secs);
        }

        // Assistant overrides
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            self.assistant.api_key = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("ASSISTANT_BASE_URL") {
            self.assistant.base_url = v;
        }
        if let Ok(v) = env::var("ASSISTANT_MODEL") {
            self.assistant.model = v;
        }
        if let Ok(v) = env::var("ASSISTANT_TIMEOUT_SECS") {
            self.assistant.timeout_secs = v.parse().unwrap_or(self.assistant.timeout_secs);
        }
        if let Ok(v) = env::var("ASSISTANT_CHAT_MAX_TOKENS") {
            self.assistant.chat_max_tokens = v.parse().unwrap_or(self.assistant.chat_max_tokens);
        }
        if let Ok(v) = env::var("ASSISTANT_VISION_MAX_TOKENS") {
            self.assistant.vision_max_tokens =
                v.parse().unwrap_or(self.assistant.vision_max_tokens);
        }
        if let Ok(v) = env::var("ASSISTANT_TEMPERATURE") {
            self.assistant.temperature = v.parse().unwrap_or(self.assistant.temperature);
        }

        // Reminder overrides
        if let Ok(v) = env::var("REMINDERS_TODAY_WINDOW") {
            match v.parse() {
                Ok(window) => self.reminders.today_window = window,
                Err(e) => tracing::warn!("Ignoring REMINDERS_TODAY_WINDOW: {}", e),
            }
        }
        if let Ok(v) = env::var("REMINDERS_UTC_OFFSET_HOURS") {
            self.reminders.utc_offset_hours = v.parse().unwrap_or(self.reminders.utc_offset_hours);
        }

        self
    }

    /// Reject settings the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.environment == Environment::Production
            && self.security.jwt_secret == DEV_JWT_SECRET
        {
            return Err(ConfigError::DevSecretInProduction);
        }
        if self.reminders.offset().is_none() {
            return Err(ConfigError::InvalidUtcOffset(self.reminders.utc_offset_hours));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 3000,
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:5000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            weather: WeatherConfig::default(),
            assistant: AssistantConfig::default(),
            reminders: RemindersConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 3000,
                max_upload_bytes: 10 * 1024 * 1024,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                enable_cors: true,
                cors_origins: vec!["https://staging.agrobagual.com.br".to_string()],
                jwt_expiry_hours: 24,
            },
            weather: WeatherConfig::default(),
            assistant: AssistantConfig::default(),
            reminders: RemindersConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 3000,
                max_upload_bytes: 10 * 1024 * 1024,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                enable_cors: true,
                cors_origins: vec!["https://app.agrobagual.com.br".to_string()],
                jwt_expiry_hours: 24,
            },
            weather: WeatherConfig { timeout_secs: 5, ..WeatherConfig::default() },
            assistant: AssistantConfig::default(),
            reminders: RemindersConfig::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            country_code: "BR".to_string(),
            lang: "pt".to_string(),
            utc_offset_hours: -3,
            timeout_secs: 10,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            timeout_secs: 60,
            chat_max_tokens: 500,
            vision_max_tokens: 600,
            temperature: 0.7,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
