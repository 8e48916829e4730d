//! Managed identity credential
//!
//! Tokens come from the hosting platform's identity endpoint. App Service
//! style hosts expose `IDENTITY_ENDPOINT` and `IDENTITY_HEADER`; virtual
//! machines answer on the instance metadata service (IMDS).

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::traits::{AccessToken, CredentialError, CredentialResult, TokenCredential};
use crate::logging;

/// Instance metadata token endpoint
pub const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";
const IDENTITY_ENDPOINT_ENV: &str = "IDENTITY_ENDPOINT";
const IDENTITY_HEADER_ENV: &str = "IDENTITY_HEADER";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
enum IdentitySource {
    Imds,
    AppService { header: String },
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_on: Option<serde_json::Value>,
}

/// Credential backed by the platform's managed identity
#[derive(Debug, Clone)]
pub struct ManagedIdentityCredential {
    // A build failure is kept and reported by `get_token`
    http: Result<reqwest::Client, String>,
    endpoint: String,
    source: IdentitySource,
    client_id: Option<String>,
}

impl Default for ManagedIdentityCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedIdentityCredential {
    /// Pick the identity endpoint from the environment, falling back to IMDS
    pub fn new() -> Self {
        match (
            std::env::var(IDENTITY_ENDPOINT_ENV),
            std::env::var(IDENTITY_HEADER_ENV),
        ) {
            (Ok(endpoint), Ok(header)) if !endpoint.is_empty() => {
                Self::app_service(endpoint, header)
            }
            _ => Self::imds(IMDS_ENDPOINT),
        }
    }

    /// Use an IMDS-compatible endpoint
    pub fn imds(endpoint: impl Into<String>) -> Self {
        Self {
            http: build_http(),
            endpoint: endpoint.into(),
            source: IdentitySource::Imds,
            client_id: None,
        }
    }

    /// Use an App Service style endpoint secured by `header`
    pub fn app_service(endpoint: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            http: build_http(),
            endpoint: endpoint.into(),
            source: IdentitySource::AppService {
                header: header.into(),
            },
            client_id: None,
        }
    }

    /// Select a user-assigned identity
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_url(&self, resource: &str) -> CredentialResult<Url> {
        let api_version = match self.source {
            IdentitySource::Imds => IMDS_API_VERSION,
            IdentitySource::AppService { .. } => APP_SERVICE_API_VERSION,
        };

        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            CredentialError::Unavailable(format!("invalid identity endpoint '{}': {}", self.endpoint, e))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", api_version);
            query.append_pair("resource", resource);
            if let Some(client_id) = &self.client_id {
                query.append_pair("client_id", client_id);
            }
        }
        Ok(url)
    }
}

fn build_http() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| {
            logging::error(
                "credentials::managed_identity",
                &format!("HTTP client init failed: {}", e),
            );
            e.to_string()
        })
}

/// `https://vault.azure.net/.default` -> `https://vault.azure.net`
fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}

/// `expires_on` arrives as epoch seconds, either a string or a number
fn parse_expires_on(value: &serde_json::Value) -> Option<SystemTime> {
    let secs = match value {
        serde_json::Value::String(s) => s.parse::<u64>().ok()?,
        serde_json::Value::Number(n) => n.as_u64()?,
        _ => return None,
    };
    Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, scopes: &[&str]) -> CredentialResult<AccessToken> {
        let scope = match scopes {
            [scope] => *scope,
            _ => {
                return Err(CredentialError::Unavailable(format!(
                    "managed identity requires exactly one scope, got {}",
                    scopes.len()
                )))
            }
        };

        let http = self.http.as_ref().map_err(|reason| {
            CredentialError::Unavailable(format!("HTTP client could not be created: {}", reason))
        })?;
        let url = self.request_url(scope_to_resource(scope))?;
        logging::debug(
            "credentials::managed_identity",
            &format!("Requesting token from {}", self.endpoint),
        );

        let request = http.get(url);
        let request = match &self.source {
            IdentitySource::Imds => request.header("Metadata", "true"),
            IdentitySource::AppService { header } => request.header("X-IDENTITY-HEADER", header),
        };

        let response = request.send().await.map_err(|e| {
            logging::error(
                "credentials::managed_identity",
                &format!("Identity endpoint unreachable: {}", e),
            );
            CredentialError::Unavailable(format!("identity endpoint unreachable: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::InvalidResponse(e.to_string()))?;

        let mut token = AccessToken::new(body.access_token);
        if let Some(expires_on) = body.expires_on.as_ref().and_then(parse_expires_on) {
            token = token.with_expiry(expires_on);
        }
        Ok(token)
    }
}
