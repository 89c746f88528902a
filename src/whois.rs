use crate::{config::Config, errors::WhoisError, Availability, Registration, UNKNOWN};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Anything that can tell whether a domain is registered.
#[async_trait]
pub trait DomainLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<Availability, WhoisError>;
}

/// Client for the remote whois API. One GET per lookup, no retries.
pub struct WhoisService {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhoisApiResponse {
    #[serde(deserialize_with = "deserialize_flag")]
    registered: bool,
    #[serde(default, alias = "registrant_name")]
    registrant: Option<String>,
    #[serde(default, alias = "date_expires")]
    expires: Option<String>,
    #[serde(default, alias = "whois_name")]
    registrar: Option<String>,
}

impl WhoisService {
    pub fn new(config: &Config) -> Result<Self, WhoisError> {
        let endpoint = Url::parse(&config.api_url)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("whois-check/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(|e| WhoisError::System(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    async fn query(&self, domain: &str, api_key: &str) -> Result<(StatusCode, String), WhoisError> {
        debug!("Querying whois API {} for {}", self.endpoint, domain);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("domain", domain), ("r", "whois"), ("apikey", api_key)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok((status, String::new()));
        }

        let body = response.text().await?;
        debug!("Whois API response length: {} bytes", body.len());
        Ok((status, body))
    }
}

#[async_trait]
impl DomainLookup for WhoisService {
    async fn lookup(&self, domain: &str) -> Result<Availability, WhoisError> {
        let api_key = self.api_key.as_deref().ok_or(WhoisError::MissingCredential)?;
        let (status, body) = self.query(domain, api_key).await?;
        map_response(domain, status, &body)
    }
}

/// Turn an HTTP status and body into an availability answer.
pub fn map_response(domain: &str, status: StatusCode, body: &str) -> Result<Availability, WhoisError> {
    match status {
        StatusCode::OK => {}
        StatusCode::UNAUTHORIZED => return Err(WhoisError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => return Err(WhoisError::RateLimited),
        other => {
            warn!("Whois API answered {} for {}", other, domain);
            return Err(WhoisError::UnexpectedStatus(other.as_u16()));
        }
    }

    let response: WhoisApiResponse = serde_json::from_str(body)
        .map_err(|e| WhoisError::InvalidResponse(e.to_string()))?;

    if !response.registered {
        return Ok(Availability::Available { domain: domain.to_string() });
    }

    Ok(Availability::Taken(Registration {
        domain: domain.to_string(),
        registrant: or_unknown(response.registrant),
        expires: or_unknown(response.expires),
        registrar: or_unknown(response.registrar),
    }))
}

fn or_unknown(field: Option<String>) -> String {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

// Whois APIs are loose about booleans: true, 1, "1" and "true" all show up.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(flag) => Ok(flag),
        serde_json::Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(D::Error::custom(format!("invalid registration flag: {}", n))),
        },
        serde_json::Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(D::Error::custom(format!("invalid registration flag: {:?}", s))),
        },
        other => Err(D::Error::custom(format!("invalid registration flag: {}", other))),
    }
}
