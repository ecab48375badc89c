// # Internet.bs Registrar Provider
//
// This crate provides the Internet.bs implementation of the `Registrar`
// trait from `dnsmig-core`.
//
// ## Behaviour
//
// - ✅ Every call is a single HTTP GET; no retries, no backoff
// - ✅ HTTP timeout configured (40 seconds by default)
// - ✅ Credentials and `ResponseFormat=json` added to every request
// - ✅ Domain list read from either `domain` or `domains`
// - ✅ Mutation rejections returned as `ApiStatus`, not as errors
// - ❌ NO atomic update (the API has none; callers remove, then add)
//
// ## Security Requirements
//
// - API password NEVER appears in logs or `Debug` output
// - Construction fails if the key or password is empty
//
// ## API Reference
//
// - List domains: GET `/Domain/List`
// - List DNS records: GET `/Domain/DnsRecordList?Domain=...`
// - Remove DNS record: GET `/Domain/DnsRecordRemove?FullRecordName=...&Type=...`
// - Add DNS record: GET `/Domain/DnsRecordAdd?FullRecordName=...&Type=...&Value=...&TTL=...`

use async_trait::async_trait;
use dnsmig_core::config::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, ProviderConfig};
use dnsmig_core::record::{ApiStatus, DnsRecord, STATUS_SUCCESS};
use dnsmig_core::traits::{Registrar, RegistrarFactory};
use dnsmig_core::{Error, Result};
use serde_json::{Map, Value};
use std::time::Duration;

/// Provider name used in logs and errors
const PROVIDER: &str = "internetbs";

/// Longest response excerpt included in error messages
const MAX_ERROR_BODY: usize = 200;

/// Response keys that may hold the domain list
const DOMAIN_LIST_KEYS: [&str; 2] = ["domain", "domains"];

/// Internet.bs registrar client
///
/// Holds the account credentials and one HTTP client shared by every call.
pub struct InternetBsRegistrar {
    /// Account API key
    api_key: String,

    /// Account API password
    /// ⚠️ NEVER log this value
    password: String,

    /// Base URL, without trailing slash
    api_base: String,

    /// HTTP client with the request timeout applied
    client: reqwest::Client,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for InternetBsRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternetBsRegistrar")
            .field("api_key", &self.api_key)
            .field("password", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl InternetBsRegistrar {
    /// Create a registrar against the production API with the default timeout
    pub fn new(api_key: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::with_options(
            api_key,
            password,
            DEFAULT_API_BASE,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a registrar with an explicit base URL and timeout
    ///
    /// The base URL is useful for the Internet.bs test environment
    /// (`https://testapi.internet.bs`) and for local mock servers.
    pub fn with_options(
        api_key: impl Into<String>,
        password: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let password = password.into();

        if api_key.trim().is_empty() || password.trim().is_empty() {
            return Err(Error::config("Internet.bs API key and password are required"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            password,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Issue one GET against `endpoint` and return the JSON object
    ///
    /// Credentials and `ResponseFormat=json` are added to `params`.
    ///
    /// # Errors
    ///
    /// - `Error::Http`: transport failure, timeout or non-success HTTP status
    /// - `Error::Json`: body is not JSON
    /// - `Error::Registrar`: body is JSON but not an object
    pub async fn api_call(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Map<String, Value>> {
        let url = format!("{}{}", self.api_base, endpoint);
        tracing::debug!("[{}] GET {}", PROVIDER, url);

        let mut query: Vec<(&str, &str)> = vec![
            ("ApiKey", self.api_key.as_str()),
            ("Password", self.password.as_str()),
            ("ResponseFormat", "json"),
        ];
        query.extend_from_slice(params);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::http(format!("Request to {} timed out", endpoint))
                } else {
                    Error::http(format!("Request to {} failed: {}", endpoint, e.without_url()))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                Error::http(format!(
                    "Failed to read response from {}: {}",
                    endpoint,
                    e.without_url()
                ))
            })?;

        if !status.is_success() {
            return Err(Error::http(format!(
                "{} returned {}: {}",
                endpoint,
                status,
                excerpt(&body)
            )));
        }

        tracing::debug!("[{}] {} -> {}", PROVIDER, endpoint, excerpt(&body));

        match serde_json::from_str::<Value>(&body)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::registrar(format!(
                "{} returned JSON that is not an object: {}",
                endpoint,
                excerpt(&other.to_string())
            ))),
        }
    }
}

#[async_trait]
impl Registrar for InternetBsRegistrar {
    async fn list_domains(&self) -> Result<Vec<String>> {
        let response = self.api_call("/Domain/List", &[]).await?;
        ensure_success(&response, "domain listing")?;
        Ok(extract_domains(&response))
    }

    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        let response = self
            .api_call("/Domain/DnsRecordList", &[("Domain", domain)])
            .await?;
        ensure_success(&response, "record listing")?;

        let records = match response.get("records") {
            Some(Value::Array(items)) => items.iter().cloned().map(DnsRecord::new).collect(),
            _ => Vec::new(),
        };
        Ok(records)
    }

    async fn remove_record(&self, full_name: &str, record_type: &str) -> Result<ApiStatus> {
        let response = self
            .api_call(
                "/Domain/DnsRecordRemove",
                &[("FullRecordName", full_name), ("Type", record_type)],
            )
            .await?;
        Ok(ApiStatus::from_response(&response))
    }

    async fn add_record(
        &self,
        full_name: &str,
        record_type: &str,
        value: &str,
        ttl: u32,
    ) -> Result<ApiStatus> {
        let ttl = ttl.to_string();
        let response = self
            .api_call(
                "/Domain/DnsRecordAdd",
                &[
                    ("FullRecordName", full_name),
                    ("Type", record_type),
                    ("Value", value),
                    ("TTL", ttl.as_str()),
                ],
            )
            .await?;
        Ok(ApiStatus::from_response(&response))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Read the domain list from whichever key the API used
///
/// The first key holding at least one name wins. A bare string is treated as
/// a one-element list; non-string entries are skipped.
pub fn extract_domains(response: &Map<String, Value>) -> Vec<String> {
    DOMAIN_LIST_KEYS
        .iter()
        .filter_map(|key| response.get(*key))
        .map(|value| match value {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Value::String(name) if !name.is_empty() => vec![name.clone()],
            _ => Vec::new(),
        })
        .find(|domains: &Vec<String>| !domains.is_empty())
        .unwrap_or_default()
}

/// Fail when the response carries a status other than `SUCCESS`
///
/// A response without any status is accepted.
fn ensure_success(response: &Map<String, Value>, what: &str) -> Result<()> {
    match response.get("status").and_then(Value::as_str) {
        None | Some(STATUS_SUCCESS) => Ok(()),
        Some(_) => {
            let status = ApiStatus::from_response(response);
            Err(Error::provider(
                PROVIDER,
                format!("{} failed: {} {}", what, status.status, status.message)
                    .trim_end()
                    .to_string(),
            ))
        }
    }
}

fn excerpt(body: &str) -> String {
    let mut out: String = body.chars().take(MAX_ERROR_BODY).collect();
    if body.chars().count() > MAX_ERROR_BODY {
        out.push('…');
    }
    out
}

/// Factory for creating Internet.bs registrars
pub struct InternetBsFactory;

impl RegistrarFactory for InternetBsFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn Registrar>> {
        config.validate()?;

        match config {
            ProviderConfig::InternetBs {
                api_key,
                password,
                api_base,
                timeout_secs,
            } => {
                if api_base.starts_with("http://") {
                    tracing::warn!(
                        "Internet.bs API base uses HTTP (not HTTPS); credentials travel in clear text"
                    );
                }

                Ok(Box::new(InternetBsRegistrar::with_options(
                    api_key.clone(),
                    password.clone(),
                    api_base.clone(),
                    Duration::from_secs(*timeout_secs),
                )?))
            }
        }
    }
}
