use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 7;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_STORAGE_DIRECTORY: &str = ".account-client";

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub api: ApiSettings,
    pub retry: RetrySettings,
    pub storage: StorageSettings,
}

/// Backend endpoint; read once at startup
#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_ms: u64, // fixed wait between transient failures
}

impl RetrySettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Where the refresh token is persisted
#[derive(serde::Deserialize, Clone, Debug)]
pub struct StorageSettings {
    pub directory: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            },
            retry: RetrySettings {
                max_attempts: DEFAULT_MAX_ATTEMPTS,
                delay_ms: DEFAULT_RETRY_DELAY_MS,
            },
            storage: StorageSettings {
                directory: PathBuf::from(DEFAULT_STORAGE_DIRECTORY),
            },
        }
    }
}

/// Load settings from defaults, an optional `configuration` file and
/// `APP_`-prefixed environment variables (e.g. `APP_API__BASE_URL`)
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.request_timeout_ms", DEFAULT_REQUEST_TIMEOUT_MS as i64)?
        .set_default("retry.max_attempts", DEFAULT_MAX_ATTEMPTS as i64)?
        .set_default("retry.delay_ms", DEFAULT_RETRY_DELAY_MS as i64)?
        .set_default("storage.directory", DEFAULT_STORAGE_DIRECTORY)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
