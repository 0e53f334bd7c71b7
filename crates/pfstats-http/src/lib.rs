// # HTTP Lookup Services
//
// This crate provides the HTTP implementations of the two remote lookups
// pfstats chains together:
//
// - `HttpIdentityService`: `GET {identity_url}/{player name}` → player id
// - `HttpStatsService`: `GET {stats_url}/{player id}` → raw stats JSON
//
// ## Status Mapping
//
// | Service  | 200                    | 204          | anything else           |
// |----------|------------------------|--------------|-------------------------|
// | identity | `id` field of the body | `NotFound`   | `Transient("identity")` |
// | stats    | parsed JSON body       | `Transient`  | `Transient("stats")`    |
//
// Requests carry the configured User-Agent and no client-side timeout.
// Neither service retries or caches; the coordinator owns both concerns.

use async_trait::async_trait;
use pfstats_core::config::EndpointConfig;
use pfstats_core::traits::{IdentityService, StatsService};
use pfstats_core::{Error, RemoteResolver, Result};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

/// Resolver wired to the configured HTTP endpoints
pub type HttpResolver = RemoteResolver<HttpIdentityService, HttpStatsService>;

/// Build both services from one endpoint configuration
pub fn resolver_from_config(config: &EndpointConfig) -> Result<HttpResolver> {
    config.validate()?;
    let client = build_client(&config.user_agent)?;

    Ok(RemoteResolver::new(
        HttpIdentityService::with_client(client.clone(), &config.identity_url),
        HttpStatsService::with_client(client, &config.stats_url),
    ))
}

fn build_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

/// Append one percent-encoded path segment to a base URL
///
/// The segment is always a single path component: `/`, `?` and `#` in a
/// player name are escaped rather than changing the request.
fn endpoint(base: &str, segment: &str) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| Error::config(format!("Invalid base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::config(format!("Base URL cannot take a path: {}", base)))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Body of a successful identity response
#[derive(Debug, Deserialize)]
struct IdentityResponse {
    id: String,
}

/// Name → id lookup over HTTP
#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpIdentityService {
    /// Create a service for `base_url` sending `user_agent`
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        Ok(Self::with_client(build_client(user_agent)?, base_url))
    }

    /// Create a service sharing an existing client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn lookup_id(&self, player_name: &str) -> Result<String> {
        let url = endpoint(&self.base_url, player_name)?;
        tracing::debug!(player = player_name, "Looking up player id");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transient("identity", format!("Request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => {
                let body: IdentityResponse = response.json().await.map_err(|e| {
                    Error::structural(format!("identity response has no usable id: {}", e))
                })?;
                Ok(body.id)
            }
            StatusCode::NO_CONTENT => Err(Error::not_found(player_name)),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error response".to_string());
                Err(Error::transient("identity", format!("{} - {}", status, body)))
            }
        }
    }

    fn service_name(&self) -> &'static str {
        "http-identity"
    }
}

/// Id → raw stats lookup over HTTP
#[derive(Debug, Clone)]
pub struct HttpStatsService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpStatsService {
    /// Create a service for `base_url` sending `user_agent`
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        Ok(Self::with_client(build_client(user_agent)?, base_url))
    }

    /// Create a service sharing an existing client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl StatsService for HttpStatsService {
    async fn fetch_stats(&self, player_id: &str) -> Result<Value> {
        let url = endpoint(&self.base_url, player_id)?;
        tracing::debug!(id = player_id, "Fetching stats");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transient("stats", format!("Request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::transient("stats", format!("{} - {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transient("stats", format!("Failed to read response: {}", e)))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn service_name(&self) -> &'static str {
        "http-stats"
    }
}
