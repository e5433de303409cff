use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        base_url: get_env_or_default("DOCSEARCH_BASE_URL", DEFAULT_BASE_URL),
        export_dir: PathBuf::from(get_env_or_default("DOCSEARCH_EXPORT_DIR", ".")),
        request_timeout: get_env_opt("DOCSEARCH_TIMEOUT_SECS")
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the search service; `search/` and `doc/{id}/` are resolved against it.
    pub base_url: String,
    /// Where exported PDFs are written.
    pub export_dir: PathBuf,
    /// `None` leaves timeouts to the transport.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Config pointing at a custom backend. Useful for tests.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            export_dir: PathBuf::from("."),
            request_timeout: None,
        }
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        CONFIG.clone()
    }
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_env_opt(key).unwrap_or_else(|| default.to_string())
}
