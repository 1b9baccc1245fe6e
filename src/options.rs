//! Client-construction options.
//!
//! All configuration is supplied once at [`Translator`](crate::Translator)
//! construction and is read-only afterwards; there are no process-wide
//! mutable defaults.

use std::time::Duration;

use serde::Deserialize;

/// Default maximum number of retries for a failed request.
pub const DEFAULT_MAX_NETWORK_RETRIES: u32 = 5;

/// Default lower bound for the per-attempt connection timeout.
pub const DEFAULT_MIN_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Proxy configuration, either one URL for all schemes or one per scheme.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProxyConfig {
    Single(String),
    PerScheme {
        http: Option<String>,
        https: Option<String>,
    },
}

/// Application identification appended to the user-agent header.
#[derive(Debug, Clone, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

/// Options accepted at client construction.
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    /// Override the base URL of the API, e.g. for testing.
    pub server_url: Option<String>,
    /// Proxy server to route requests through.
    pub proxy: Option<ProxyConfig>,
    /// Set to false to skip TLS certificate verification.
    pub verify_ssl: bool,
    /// Whether anonymous platform information (OS, architecture) may be
    /// included in the user-agent header.
    pub send_platform_info: bool,
    /// Maximum number of retries for a failed request.
    pub max_network_retries: u32,
    /// Lower bound for the per-attempt connection timeout.
    pub min_connection_timeout: Duration,
    /// Replace the generated user-agent header entirely.
    pub user_agent: Option<String>,
    /// Identify the calling application in the user-agent header.
    pub app_info: Option<AppInfo>,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            server_url: None,
            proxy: None,
            verify_ssl: true,
            send_platform_info: true,
            max_network_retries: DEFAULT_MAX_NETWORK_RETRIES,
            min_connection_timeout: DEFAULT_MIN_CONNECTION_TIMEOUT,
            user_agent: None,
            app_info: None,
        }
    }
}

impl TranslatorOptions {
    /// Sets the application identification included in the user-agent header.
    pub fn with_app_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.app_info = Some(AppInfo {
            name: name.into(),
            version: version.into(),
        });
        self
    }
}
