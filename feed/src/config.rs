use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the posts backend
    pub api_url: String,
    /// Bearer token used when no session file is configured
    pub api_token: Option<String>,
    /// JSON session store holding `token` and the cached `user`
    pub session_file: Option<PathBuf>,
    pub page_size: u32,
    pub search_debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            session_file: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api_url: env::var("FEED_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_token: env::var("FEED_API_TOKEN").ok().filter(|t| !t.is_empty()),
            session_file: env::var("FEED_SESSION_FILE").ok().map(PathBuf::from),
            page_size: parse_var("FEED_PAGE_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            search_debounce: Duration::from_millis(
                parse_var("FEED_SEARCH_DEBOUNCE_MS").unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS),
            ),
            request_timeout: Duration::from_secs(
                parse_var("FEED_REQUEST_TIMEOUT_SECS").unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}
