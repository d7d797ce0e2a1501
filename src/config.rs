//! Application configuration loaded from environment variables.
//!
//! The market data key **must** be provided via the environment (or the
//! keychain, see [`crate::credentials`]):
//! - `SOLANA_TRACKER_API_KEY`: key sent as `x-api-key` to the token and chart API
//!
//! Optional overrides:
//! - `SOLANA_TRACKER_API_URL`: base URL of the token and chart API
//! - `LLM_API_KEY`: bearer key for the chat completion API; without it the
//!   terminal narrates with a local template
//! - `LLM_API_URL`, `LLM_MODEL`: chat completion endpoint and model
//! - `PRICE_FEED_URL`: SOL/USD spot price endpoint
//! - `BLYV_CHART_DELAY_MS`: pause between the token and chart requests
//! - `BLYV_HTTP_TIMEOUT_SECS`: per-request timeout
//! - `BLYV_LOG_FILE`: where tracing output goes

use std::path::PathBuf;
use std::time::Duration;

/// Default token/chart API.
const DEFAULT_TRACKER_URL: &str = "https://data.solanatracker.io";

/// Default OpenAI-compatible chat completion endpoint.
const DEFAULT_LLM_URL: &str = "https://api.openai.com/v1/chat/completions";

const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

const DEFAULT_PRICE_FEED_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd";

const DEFAULT_CHART_DELAY_MS: u64 = 3_000;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

const DEFAULT_LOG_FILE: &str = "blyv.log";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub tracker: TrackerConfig,
    pub llm: LlmConfig,
    pub price_feed_url: String,
    /// Pause inserted between the token lookup and the chart lookup.
    pub chart_delay: Duration,
    pub http_timeout: Duration,
    pub log_file: PathBuf,
}

/// Token and chart API settings.
#[derive(Debug)]
pub struct TrackerConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Chat completion settings.
#[derive(Debug)]
pub struct LlmConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub model: String,
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`BlyvError::Config`](crate::BlyvError::Config) if
/// `SOLANA_TRACKER_API_KEY` is missing, a numeric variable does not parse,
/// or the HTTP timeout is zero.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let api_key = non_empty_var("SOLANA_TRACKER_API_KEY").ok_or_else(|| {
        crate::BlyvError::Config("SOLANA_TRACKER_API_KEY is not set".to_string())
    })?;

    let base_url = non_empty_var("SOLANA_TRACKER_API_URL")
        .unwrap_or_else(|| DEFAULT_TRACKER_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let chart_delay_ms = parse_var("BLYV_CHART_DELAY_MS", DEFAULT_CHART_DELAY_MS)?;
    let timeout_secs = parse_var("BLYV_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
    if timeout_secs == 0 {
        return Err(crate::BlyvError::Config(
            "BLYV_HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        tracker: TrackerConfig { base_url, api_key },
        llm: LlmConfig {
            url: non_empty_var("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_URL.to_string()),
            api_key: non_empty_var("LLM_API_KEY"),
            model: non_empty_var("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        },
        price_feed_url: non_empty_var("PRICE_FEED_URL")
            .unwrap_or_else(|| DEFAULT_PRICE_FEED_URL.to_string()),
        chart_delay: Duration::from_millis(chart_delay_ms),
        http_timeout: Duration::from_secs(timeout_secs),
        log_file: non_empty_var("BLYV_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Parses an optional numeric variable, falling back to `default` when unset.
fn parse_var(name: &str, default: u64) -> crate::Result<u64> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            crate::BlyvError::Config(format!("{name} must be a whole number, got {raw:?}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 9] = [
        "SOLANA_TRACKER_API_KEY",
        "SOLANA_TRACKER_API_URL",
        "LLM_API_URL",
        "LLM_API_KEY",
        "LLM_MODEL",
        "PRICE_FEED_URL",
        "BLYV_CHART_DELAY_MS",
        "BLYV_HTTP_TIMEOUT_SECS",
        "BLYV_LOG_FILE",
    ];

    /// Serializes tests that touch the process environment.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    /// Helper that clears every config var, applies `vars`, runs `f`, then
    /// restores the originals.
    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let originals: Vec<(&str, Option<String>)> = ALL_VARS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        for k in ALL_VARS {
            // SAFETY: guarded by ENV_LOCK; nothing else in this crate's tests reads these vars.
            unsafe { std::env::remove_var(k) };
        }
        for (k, v) in vars {
            // SAFETY: see above.
            unsafe { std::env::set_var(k, v) };
        }

        f();

        for (k, original) in originals {
            // SAFETY: restoring original values under the same lock.
            unsafe {
                match original {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn defaults_with_only_the_api_key() {
        with_env(&[("SOLANA_TRACKER_API_KEY", "tracker-key")], || {
            let config = fetch_config().unwrap();
            assert_eq!(config.tracker.api_key, "tracker-key");
            assert_eq!(config.tracker.base_url, DEFAULT_TRACKER_URL);
            assert_eq!(config.llm.url, DEFAULT_LLM_URL);
            assert_eq!(config.llm.model, DEFAULT_LLM_MODEL);
            assert!(config.llm.api_key.is_none());
            assert_eq!(config.price_feed_url, DEFAULT_PRICE_FEED_URL);
            assert_eq!(config.chart_delay, Duration::from_millis(3_000));
            assert_eq!(config.http_timeout, Duration::from_secs(15));
            assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        });
    }

    #[test]
    fn rejects_missing_api_key() {
        with_env(&[], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("SOLANA_TRACKER_API_KEY is not set"));
        });
    }

    #[test]
    fn empty_values_treated_as_absent() {
        with_env(
            &[
                ("SOLANA_TRACKER_API_KEY", "k"),
                ("LLM_API_KEY", ""),
                ("SOLANA_TRACKER_API_URL", "  "),
                ("BLYV_CHART_DELAY_MS", ""),
            ],
            || {
                let config = fetch_config().unwrap();
                assert!(config.llm.api_key.is_none());
                assert_eq!(config.tracker.base_url, DEFAULT_TRACKER_URL);
                assert_eq!(config.chart_delay, Duration::from_millis(3_000));
            },
        );
    }

    #[test]
    fn overrides_are_applied() {
        with_env(
            &[
                ("SOLANA_TRACKER_API_KEY", "k"),
                ("SOLANA_TRACKER_API_URL", "https://tracker.example.com/"),
                ("LLM_API_KEY", "sk-test"),
                ("LLM_MODEL", "llama-3"),
                ("BLYV_CHART_DELAY_MS", "0"),
                ("BLYV_HTTP_TIMEOUT_SECS", "5"),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.tracker.base_url, "https://tracker.example.com");
                assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
                assert_eq!(config.llm.model, "llama-3");
                assert_eq!(config.chart_delay, Duration::ZERO);
                assert_eq!(config.http_timeout, Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn rejects_non_numeric_delay() {
        with_env(
            &[("SOLANA_TRACKER_API_KEY", "k"), ("BLYV_CHART_DELAY_MS", "3s")],
            || {
                let err = fetch_config().unwrap_err();
                assert!(err.to_string().contains("BLYV_CHART_DELAY_MS"));
            },
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        with_env(
            &[("SOLANA_TRACKER_API_KEY", "k"), ("BLYV_HTTP_TIMEOUT_SECS", "0")],
            || {
                let err = fetch_config().unwrap_err();
                assert!(err.to_string().contains("greater than zero"));
            },
        );
    }
}
