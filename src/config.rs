//! Environment-driven configuration with code defaults.

use std::time::Duration;

const DEFAULT_SERVER: &str = "http://localhost:8081";
const DEFAULT_PAGE_SIZE: u32 = 50;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
/// Preview stepping starts a background load this many items before the
/// loaded end.
const DEFAULT_READ_AHEAD: usize = 5;
const DEFAULT_PREVIEW_CACHE: usize = 64;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub page_size: u32,
    pub search_debounce: Duration,
    pub read_ahead: usize,
    pub preview_cache: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_url: std::env::var("MEDIAWALL_SERVER")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            page_size: env_parse("MEDIAWALL_PAGE_SIZE", DEFAULT_PAGE_SIZE).max(1),
            search_debounce: Duration::from_millis(env_parse(
                "MEDIAWALL_SEARCH_DEBOUNCE_MS",
                DEFAULT_SEARCH_DEBOUNCE_MS,
            )),
            read_ahead: env_parse("MEDIAWALL_READ_AHEAD", DEFAULT_READ_AHEAD),
            preview_cache: env_parse("MEDIAWALL_PREVIEW_CACHE", DEFAULT_PREVIEW_CACHE).max(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            read_ahead: DEFAULT_READ_AHEAD,
            preview_cache: DEFAULT_PREVIEW_CACHE,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
