use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::Error;
use crate::params::Params;

const DEFAULT_USER_AGENT: &str = concat!("apikit/", env!("CARGO_PKG_VERSION"));

/// Static client metadata sent as form fields with every request.
///
/// The embedding application fills in what it knows; empty fields are
/// skipped on the wire.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub os_name: String,
    pub os_version: String,
    pub device_id: String,
    pub device_brand: String,
    pub device_model: String,
    pub app_version: String,
}

impl ClientInfo {
    pub(crate) fn as_params(&self) -> Params {
        let mut params = Params::new();
        for (key, value) in [
            ("osName", &self.os_name),
            ("osVersion", &self.os_version),
            ("deviceId", &self.device_id),
            ("deviceBrand", &self.device_brand),
            ("deviceModel", &self.device_model),
            ("appVersion", &self.app_version),
        ] {
            if !value.is_empty() {
                params = params.set(key, value);
            }
        }
        params
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
    /// Zero disables client-side throttling.
    pub rate_limit_per_second: u32,
    /// Paths whose request bodies are sent gzip-compressed.
    pub gzip_paths: Vec<String>,
    /// Headers added to every request.
    pub default_headers: HashMap<String, String>,
    pub client_info: ClientInfo,
    /// Fields merged into every request, below per-call parameters.
    pub extra_params: Params,
    /// Log request and response bodies at debug level.
    pub log_bodies: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 60,
            request_timeout_secs: 60,
            pool_max_idle_per_host: 8,
            pool_idle_timeout_secs: 15,
            rate_limit_per_second: 0,
            gzip_paths: Vec::new(),
            default_headers: HashMap::new(),
            client_info: ClientInfo::default(),
            extra_params: Params::new(),
            log_bodies: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the environment (`APIKIT_*` variables).
    ///
    /// Only `APIKIT_BASE_URL` is required; everything else falls back to
    /// defaults matching the production transport settings.
    pub fn from_env() -> Result<Self, Error> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Self {
            base_url: env::var("APIKIT_BASE_URL")
                .map_err(|_| Error::config("APIKIT_BASE_URL must be set"))?,
            user_agent: env::var("APIKIT_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            connect_timeout_secs: parse_var("APIKIT_CONNECT_TIMEOUT_SECS", 60)?,
            request_timeout_secs: parse_var("APIKIT_REQUEST_TIMEOUT_SECS", 60)?,
            pool_max_idle_per_host: parse_var("APIKIT_POOL_MAX_IDLE", 8)?,
            pool_idle_timeout_secs: parse_var("APIKIT_POOL_IDLE_TIMEOUT_SECS", 15)?,
            rate_limit_per_second: parse_var("APIKIT_RATE_LIMIT_PER_SECOND", 0)?,
            gzip_paths: env::var("APIKIT_GZIP_PATHS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|path| !path.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            default_headers: HashMap::new(),
            client_info: ClientInfo::default(),
            extra_params: Params::new(),
            log_bodies: env::var("APIKIT_LOG_BODIES")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(false),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.rate_limit_per_second = requests_per_second;
        self
    }

    pub fn with_gzip_path(mut self, path: impl Into<String>) -> Self {
        self.gzip_paths.push(path.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_client_info(mut self, client_info: ClientInfo) -> Self {
        self.client_info = client_info;
        self
    }

    pub fn with_extra_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.extra_params = self.extra_params.set(key, value);
        self
    }

    pub fn with_log_bodies(mut self, log_bodies: bool) -> Self {
        self.log_bodies = log_bodies;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }

    /// Whether a request to `path` should send a gzip-compressed body.
    pub fn is_gzip_path(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        self.gzip_paths
            .iter()
            .any(|candidate| candidate.trim_start_matches('/') == path)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::config(format!("{name} must be a valid number"))),
        Err(_) => Ok(default),
    }
}
