use omniface_link::endpoint::DEFAULT_BACKEND_PORT;
use omniface_link::Endpoint;
use omniface_live::SessionOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// Backend `host[:port]`; takes precedence over `page_host`/`backend_port`.
    pub backend_override: Option<String>,
    /// Host the backend runs on when no override is set.
    pub page_host: String,
    pub backend_port: u16,
    /// Use `wss://` / `https://`.
    pub secure: bool,
    /// Bearer credential, with or without the `Bearer ` prefix.
    pub token: Option<String>,
    pub throttle_ms: u64,
    pub connect_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub history_len: usize,
    /// Where the remembered multi-camera view is stored.
    pub prefs_path: PathBuf,
}

impl Config {
    /// Load configuration from `OMNIFACE_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let config_dir = var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".config")
            })
            .join("omniface");

        let prefs_path = var("OMNIFACE_PREFS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.join("view.toml"));

        Self {
            backend_override: var("OMNIFACE_BACKEND_WS").filter(|v| !v.trim().is_empty()),
            page_host: var("OMNIFACE_PAGE_HOST").unwrap_or_else(|| "localhost".to_string()),
            backend_port: parse_var(&var, "OMNIFACE_BACKEND_PORT").unwrap_or(DEFAULT_BACKEND_PORT),
            secure: var("OMNIFACE_SECURE").map(|v| v == "1").unwrap_or(false),
            token: var("OMNIFACE_TOKEN"),
            throttle_ms: parse_var(&var, "OMNIFACE_THROTTLE_MS").unwrap_or(60),
            connect_timeout_secs: parse_var(&var, "OMNIFACE_CONNECT_TIMEOUT_SECS").unwrap_or(10),
            http_timeout_secs: parse_var(&var, "OMNIFACE_HTTP_TIMEOUT_SECS").unwrap_or(10),
            history_len: parse_var(&var, "OMNIFACE_HISTORY_LEN").unwrap_or(60),
            prefs_path,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::resolve(
            self.backend_override.as_deref(),
            &self.page_host,
            self.backend_port,
            self.secure,
        )
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            throttle_window: Duration::from_millis(self.throttle_ms),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            history_len: self.history_len,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Token to hand to `connect`; empty when unset so the session reports it.
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }
}

fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|v| v.trim().parse().ok())
}
