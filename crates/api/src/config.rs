use std::env;
use std::time::Duration;

use vera_llm::env_or;

const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
];

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    pub body_limit_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max: 30,
            body_limit_bytes: 16 * 1024,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind: env::var("VERA_BIND").unwrap_or(defaults.bind),
            allowed_origins: env::var("VERA_ALLOWED_ORIGINS")
                .ok()
                .map(|value| parse_origins(&value))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.allowed_origins),
            rate_limit_window: Duration::from_secs(env_or(
                "VERA_RATE_LIMIT_WINDOW_SECONDS",
                defaults.rate_limit_window.as_secs(),
            )),
            rate_limit_max: env_or("VERA_RATE_LIMIT_MAX", defaults.rate_limit_max),
            body_limit_bytes: env_or("VERA_BODY_LIMIT_BYTES", defaults.body_limit_bytes),
        }
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
