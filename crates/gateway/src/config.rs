//! Gateway configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SIMLA_API_URL` - Base URL of the CRM account (e.g., `https://shop.simla.com`)
//! - `SIMLA_API_KEY` - API key sent as `X-API-KEY` (HIGH PRIVILEGE)
//!
//! ## Optional
//! - `SIMLA_CACHE_DIR` - Directory for cached list results (default: `var/cache`)
//! - `SIMLA_CACHE_TTL_SECS` - Treat cache files older than this as missing (default: never stale)
//! - `SIMLA_TIMEOUT_SECS` - HTTP request timeout (default: 30)
//! - `SIMLA_LOG_PAYLOADS` - Log full customer payloads at debug level (default: false).
//!   Payloads contain personal data; only enable while debugging.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_CACHE_DIR: &str = "var/cache";
const DEFAULT_TIMEOUT_SECS: &str = "30";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Simla API and cache configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SimlaConfig {
    /// Account base URL, without trailing slash
    pub api_url: String,
    /// API key (HIGH PRIVILEGE - full account access)
    pub api_key: SecretString,
    /// Directory holding cached list results
    pub cache_dir: PathBuf,
    /// Maximum cache file age, `None` for no expiry
    pub cache_ttl: Option<Duration>,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Whether customer payloads are written to debug logs
    pub log_payloads: bool,
}

impl std::fmt::Debug for SimlaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimlaConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("cache_dir", &self.cache_dir)
            .field("cache_ttl", &self.cache_ttl)
            .field("timeout", &self.timeout)
            .field("log_payloads", &self.log_payloads)
            .finish()
    }
}

impl SimlaConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`SimlaConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let api_url = parse_api_url(&env.required("SIMLA_API_URL")?)?;

        let api_key = env.required("SIMLA_API_KEY")?;
        validate_secret_strength(&api_key, "SIMLA_API_KEY")?;

        let cache_dir = PathBuf::from(env.or_default("SIMLA_CACHE_DIR", DEFAULT_CACHE_DIR));

        let cache_ttl = env
            .optional("SIMLA_CACHE_TTL_SECS")
            .map(|s| {
                s.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidEnvVar("SIMLA_CACHE_TTL_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let timeout = env
            .or_default("SIMLA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SIMLA_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let log_payloads = env
            .optional("SIMLA_LOG_PAYLOADS")
            .map(|s| parse_bool(&s, "SIMLA_LOG_PAYLOADS"))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            api_url,
            api_key: SecretString::from(api_key),
            cache_dir,
            cache_ttl,
            timeout,
            log_payloads,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Validate the account URL and strip any trailing slash.
fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("SIMLA_API_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "SIMLA_API_URL".to_string(),
            format!("expected an http(s) URL with a host, got {raw}"),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_bool(value: &str, var_name: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected a boolean, got {other}"),
        )),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key generated in the CRM settings."
            ),
        ));
    }

    Ok(())
}
