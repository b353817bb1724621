//! Simla (`RetailCRM`) REST API client.
//!
//! Provides access to the customer and order endpoints of API v5.
//!
//! # API Reference
//!
//! - Base URL: the account URL, e.g. `https://shop.simla.com`
//! - Authentication: `X-API-KEY: <key>`
//! - Versioned endpoints live under `/api/v5`; the credentials check is unversioned
//! - Writes are `application/x-www-form-urlencoded`, with entities JSON-encoded
//!   into single form fields
//! - Errors come back as `{"success": false, "errorMsg": "...", "errors": {...}}`

mod customers;
mod orders;
mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::SimlaConfig;

/// Prefix for versioned API endpoints.
const API_PREFIX: &str = "/api/v5";

/// Message the CRM returns for an unknown account subdomain.
const ACCOUNT_MISSING_MESSAGE: &str = "Account does not exist.";

/// Errors that can occur when interacting with the Simla API.
#[derive(Debug, Error)]
pub enum SimlaError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API key missing, malformed or rejected.
    #[error("Missing or invalid credentials ({status}): {message}")]
    MissingCredentials { status: u16, message: String },

    /// The account behind the base URL does not exist.
    #[error("Account does not exist ({status}): {message}")]
    AccountDoesNotExist { status: u16, message: String },

    /// The request entity failed validation.
    #[error("Validation error ({status}): {message}{}", format_field_errors(.errors))]
    Validation {
        status: u16,
        message: String,
        errors: Vec<String>,
    },

    /// A required request parameter was not sent.
    #[error("Missing parameter ({status}): {message}")]
    MissingParameter { status: u16, message: String },

    /// Rate limited by the CRM.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other API error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A response arrived but could not be decoded, or a request could not be encoded.
    #[error("Handler error: {0}")]
    Handler(String),
}

impl SimlaError {
    /// HTTP status code of the failed response, if one was received.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::MissingCredentials { status, .. }
            | Self::AccountDoesNotExist { status, .. }
            | Self::Validation { status, .. }
            | Self::MissingParameter { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::RateLimited(_) => Some(429),
            Self::Handler(_) => None,
        }
    }
}

fn format_field_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(" [{}]", errors.join("; "))
    }
}

/// Simla API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct SimlaClient {
    inner: Arc<SimlaClientInner>,
}

struct SimlaClientInner {
    client: reqwest::Client,
    api_url: String,
}

impl SimlaClient {
    /// Create a new Simla API client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SimlaConfig) -> Result<Self, SimlaError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "X-API-KEY",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| SimlaError::Handler(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(SimlaClientInner {
                client,
                api_url: config.api_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Account base URL this client talks to.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    /// Execute a GET request against a versioned endpoint.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SimlaError> {
        let response = self.inner.client.get(self.versioned_url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a GET request against a path relative to the account URL.
    pub(crate) async fn get_raw<T: DeserializeOwned>(&self, path: &str) -> Result<T, SimlaError> {
        let url = format!("{}{path}", self.inner.api_url);
        let response = self.inner.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a form-encoded POST request against a versioned endpoint.
    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, SimlaError> {
        let response = self
            .inner
            .client
            .post(self.versioned_url(path))
            .form(form)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    fn versioned_url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.inner.api_url)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SimlaError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body)
                .map_err(|e| SimlaError::Handler(format!("Failed to parse response: {e}")));
        }

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(classify_error(status.as_u16(), retry_after, &body))
    }
}

impl std::fmt::Debug for SimlaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimlaClient")
            .field("api_url", &self.inner.api_url)
            .finish_non_exhaustive()
    }
}

/// Map an error response onto the CRM's failure taxonomy.
fn classify_error(status: u16, retry_after: Option<u64>, body: &str) -> SimlaError {
    if status == 429 {
        return SimlaError::RateLimited(retry_after.unwrap_or(60));
    }

    let (message, errors) = match serde_json::from_str::<types::ErrorBody>(body) {
        Ok(parsed) => (
            parsed.error_msg.unwrap_or_else(|| fallback_message(body)),
            flatten_field_errors(parsed.errors.as_ref()),
        ),
        Err(_) => (fallback_message(body), Vec::new()),
    };

    if message == ACCOUNT_MISSING_MESSAGE {
        return SimlaError::AccountDoesNotExist { status, message };
    }

    if status == 401 || status == 403 || message.contains("apiKey") {
        return SimlaError::MissingCredentials { status, message };
    }

    if message.starts_with("Parameter") && message.ends_with("is missing") {
        return SimlaError::MissingParameter { status, message };
    }

    if !errors.is_empty() {
        return SimlaError::Validation {
            status,
            message,
            errors,
        };
    }

    SimlaError::Api { status, message }
}

fn fallback_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Flatten the `errors` member, which is either a field map or a plain list.
fn flatten_field_errors(errors: Option<&serde_json::Value>) -> Vec<String> {
    use serde_json::Value;

    let as_text = |v: &Value| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    match errors {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(field, msg)| format!("{field}: {}", as_text(msg)))
            .collect(),
        Some(Value::Array(items)) => items.iter().map(as_text).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(api_url: &str) -> SimlaConfig {
        SimlaConfig {
            api_url: api_url.to_string(),
            api_key: secrecy::SecretString::from("Qw8fZ2LmN4xR7tYb1KcV9pHs3JdE6uGa".to_string()),
            cache_dir: std::env::temp_dir(),
            cache_ttl: None,
            timeout: std::time::Duration::from_secs(5),
            log_payloads: false,
        }
    }

    #[test]
    fn test_versioned_url_drops_trailing_slash() {
        let client = SimlaClient::new(&config("https://shop.simla.com/")).unwrap();

        assert_eq!(client.api_url(), "https://shop.simla.com");
        assert_eq!(
            client.versioned_url("/customers/combine"),
            "https://shop.simla.com/api/v5/customers/combine"
        );
    }

    #[test]
    fn test_classify_validation_error() {
        let body = r#"{"success":false,"errorMsg":"Errors in the entity format","errors":{"email":"Invalid email"}}"#;
        let err = classify_error(400, None, body);

        assert!(matches!(
            err,
            SimlaError::Validation { status: 400, ref errors, .. }
                if errors == &["email: Invalid email"]
        ));
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(
            err.to_string(),
            "Validation error (400): Errors in the entity format [email: Invalid email]"
        );
    }

    #[test]
    fn test_classify_list_errors() {
        let body = r#"{"success":false,"errorMsg":"Errors in the input parameters","errors":["limit is invalid"]}"#;
        let err = classify_error(400, None, body);
        assert!(matches!(err, SimlaError::Validation { ref errors, .. } if errors.len() == 1));
    }

    #[test]
    fn test_classify_missing_credentials() {
        let body = r#"{"success":false,"errorMsg":"Wrong \"apiKey\" value."}"#;
        let err = classify_error(403, None, body);
        assert!(matches!(
            err,
            SimlaError::MissingCredentials { status: 403, .. }
        ));
    }

    #[test]
    fn test_classify_account_missing() {
        let body = r#"{"success":false,"errorMsg":"Account does not exist."}"#;
        let err = classify_error(404, None, body);
        assert!(matches!(
            err,
            SimlaError::AccountDoesNotExist { status: 404, .. }
        ));
    }

    #[test]
    fn test_classify_missing_parameter() {
        let body = r#"{"success":false,"errorMsg":"Parameter 'customer' is missing"}"#;
        let err = classify_error(400, None, body);
        assert!(matches!(err, SimlaError::MissingParameter { .. }));
    }

    #[test]
    fn test_classify_rate_limited() {
        let err = classify_error(429, Some(5), "");
        assert!(matches!(err, SimlaError::RateLimited(5)));
        assert_eq!(err.status_code(), Some(429));

        assert!(matches!(
            classify_error(429, None, ""),
            SimlaError::RateLimited(60)
        ));
    }

    #[test]
    fn test_classify_non_json_body() {
        let err = classify_error(502, None, "  Bad Gateway  ");
        assert!(matches!(
            err,
            SimlaError::Api { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn test_handler_error_has_no_status() {
        assert_eq!(SimlaError::Handler("boom".to_string()).status_code(), None);
    }
}
