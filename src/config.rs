use std::{env, net::SocketAddr, str::FromStr};

use crate::models::Language;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub node_binary: String,
    pub python_binary: String,
    /// Wall-clock budget for JavaScript executions.
    pub javascript_timeout_ms: u64,
    /// Wall-clock budget for Python executions.
    pub python_timeout_ms: u64,
    pub max_code_bytes: usize,
    /// Ceiling on captured bytes per output stream.
    pub max_output_bytes: usize,
    pub rate_limit_per_minute: u32,
    pub rate_limit_burst: u32,
    /// Rate-limit buckets idle this long are dropped.
    pub rate_limit_idle_secs: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_parse("BIND_ADDR", defaults.bind_addr),
            node_binary: env::var("NODE_BINARY").unwrap_or(defaults.node_binary),
            python_binary: env::var("PYTHON_BINARY").unwrap_or(defaults.python_binary),
            javascript_timeout_ms: env_parse(
                "JAVASCRIPT_TIMEOUT_MS",
                defaults.javascript_timeout_ms,
            ),
            python_timeout_ms: env_parse("PYTHON_TIMEOUT_MS", defaults.python_timeout_ms),
            max_code_bytes: env_parse("MAX_CODE_BYTES", defaults.max_code_bytes),
            max_output_bytes: env_parse("MAX_OUTPUT_BYTES", defaults.max_output_bytes),
            rate_limit_per_minute: env_parse(
                "RATE_LIMIT_PER_MINUTE",
                defaults.rate_limit_per_minute,
            ),
            rate_limit_burst: env_parse("RATE_LIMIT_BURST", defaults.rate_limit_burst),
            rate_limit_idle_secs: env_parse("RATE_LIMIT_IDLE_SECS", defaults.rate_limit_idle_secs),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    pub fn timeout_ms(&self, language: Language) -> u64 {
        match language {
            Language::JavaScript => self.javascript_timeout_ms,
            Language::Python => self.python_timeout_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            node_binary: "node".to_string(),
            python_binary: "python3".to_string(),
            javascript_timeout_ms: 1200,
            python_timeout_ms: 2000,
            max_code_bytes: 100 * 1024,
            max_output_bytes: 64 * 1024,
            rate_limit_per_minute: 60,
            rate_limit_burst: 10,
            rate_limit_idle_secs: 30 * 60,
            log_level: "info".to_string(),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
