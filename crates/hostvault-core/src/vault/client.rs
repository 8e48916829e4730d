//! Key Vault REST client
//!
//! Lists secrets page by page (`nextLink`) and reads current secret values.
//! Every request carries a bearer token from the injected credential; one
//! token is acquired per listing and per batch of secret reads.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use url::Url;

use super::traits::{
    SecretBundle, SecretItem, VaultClient, VaultError, VaultResult, MAX_CONCURRENT_FETCHES,
};
use crate::credentials::{AccessToken, SharedCredential};
use crate::logging;

/// REST API version sent with every request
pub const KEY_VAULT_API_VERSION: &str = "7.4";

/// Token scope for the vault data plane
pub const KEY_VAULT_SCOPE: &str = "https://vault.azure.net/.default";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretListResponse {
    #[serde(default)]
    value: Vec<SecretItemResponse>,
    #[serde(default)]
    next_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SecretAttributes {
    #[serde(default)]
    enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretItemResponse {
    id: String,
    #[serde(default)]
    attributes: SecretAttributes,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    tags: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretBundleResponse {
    value: String,
    #[serde(default)]
    content_type: Option<String>,
}

/// `https://v.example.net/secrets/Name[/version]` -> `Name`
fn secret_name_from_id(id: &str) -> Option<String> {
    let url = Url::parse(id).ok()?;
    let mut segments = url.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "secrets" {
            return segments.next().filter(|s| !s.is_empty()).map(str::to_string);
        }
    }
    None
}

/// HTTP vault client
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use hostvault_core::credentials::ManagedIdentityCredential;
/// use hostvault_core::vault::KeyVaultClient;
///
/// let client = KeyVaultClient::new(Arc::new(ManagedIdentityCredential::new()));
/// ```
#[derive(Clone)]
pub struct KeyVaultClient {
    // A build failure is kept and reported by the first request
    http: Result<reqwest::Client, String>,
    credential: SharedCredential,
}

impl KeyVaultClient {
    pub fn new(credential: SharedCredential) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                logging::error("vault::client", &format!("HTTP client init failed: {}", e));
                e.to_string()
            });
        Self { http, credential }
    }

    #[cfg(test)]
    pub(crate) fn with_http_error(credential: SharedCredential, reason: &str) -> Self {
        Self {
            http: Err(reason.to_string()),
            credential,
        }
    }

    fn user_agent() -> String {
        format!("hostvault/{}", env!("CARGO_PKG_VERSION"))
    }

    fn http(&self) -> VaultResult<&reqwest::Client> {
        self.http
            .as_ref()
            .map_err(|reason| VaultError::ClientInit(reason.clone()))
    }

    async fn token(&self) -> VaultResult<AccessToken> {
        Ok(self.credential.get_token(&[KEY_VAULT_SCOPE]).await?)
    }

    /// `{vault}/secrets[/name]?api-version=...`, keeping any base path
    fn secrets_url(vault_uri: &str, name: Option<&str>) -> VaultResult<Url> {
        let mut url =
            Url::parse(vault_uri).map_err(|_| VaultError::InvalidVaultUri(vault_uri.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| VaultError::InvalidVaultUri(vault_uri.to_string()))?;
            segments.pop_if_empty().push("secrets");
            if let Some(name) = name {
                segments.push(name);
            }
        }
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("api-version", KEY_VAULT_API_VERSION);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        token: &AccessToken,
        what: &str,
    ) -> VaultResult<T> {
        let http = self.http()?;

        logging::debug("vault::client", &format!("GET {}{}", url.origin().ascii_serialization(), url.path()));

        let resp = http
            .get(url)
            .bearer_auth(&token.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                logging::error("vault::client", &format!("Request failed: {}", e));
                VaultError::Network(e)
            })?;

        match resp.status().as_u16() {
            200 => resp
                .json::<T>()
                .await
                .map_err(|e| VaultError::InvalidResponse(e.to_string())),
            401 | 403 => Err(VaultError::Unauthorized),
            404 => Err(VaultError::NotFound(what.to_string())),
            429 => Err(VaultError::RateLimited),
            status @ 500..=599 => Err(VaultError::ServerError(status)),
            other => Err(VaultError::UnexpectedStatus(other)),
        }
    }

    async fn fetch_secret(
        &self,
        vault_uri: &str,
        name: &str,
        token: &AccessToken,
    ) -> VaultResult<SecretBundle> {
        let url = Self::secrets_url(vault_uri, Some(name))?;
        let body: SecretBundleResponse = self
            .get_json(url, token, &format!("secret '{}'", name))
            .await?;

        Ok(SecretBundle {
            name: name.to_string(),
            value: body.value,
            content_type: body.content_type,
        })
    }
}

impl std::fmt::Debug for KeyVaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVaultClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl VaultClient for KeyVaultClient {
    async fn list_secrets(&self, vault_uri: &str) -> VaultResult<Vec<SecretItem>> {
        let first = Self::secrets_url(vault_uri, None)?;
        self.http()?;
        let token = self.token().await?;
        let origin = first.origin();
        let mut visited = HashSet::from([first.clone()]);
        let mut next = Some(first);
        let mut items = Vec::new();

        while let Some(url) = next.take() {
            let page: SecretListResponse = self.get_json(url, &token, "secrets").await?;

            for entry in page.value {
                let name = secret_name_from_id(&entry.id).ok_or_else(|| {
                    VaultError::InvalidResponse(format!("unrecognised secret id '{}'", entry.id))
                })?;
                items.push(SecretItem {
                    name,
                    enabled: entry.attributes.enabled.unwrap_or(true),
                    content_type: entry.content_type,
                    tags: entry.tags.unwrap_or_default(),
                });
            }

            if let Some(link) = page.next_link.filter(|l| !l.is_empty()) {
                let link = Url::parse(&link)
                    .map_err(|_| VaultError::InvalidResponse(format!("invalid nextLink '{}'", link)))?;
                // The bearer token must not leave the vault's origin
                if link.origin() != origin {
                    return Err(VaultError::InvalidResponse(
                        "nextLink points outside the vault".to_string(),
                    ));
                }
                if !visited.insert(link.clone()) {
                    return Err(VaultError::InvalidResponse(
                        "nextLink revisits an earlier page".to_string(),
                    ));
                }
                next = Some(link);
            }
        }

        logging::debug("vault::client", &format!("Listed {} secrets", items.len()));
        Ok(items)
    }

    async fn get_secret(&self, vault_uri: &str, name: &str) -> VaultResult<SecretBundle> {
        self.http()?;
        let token = self.token().await?;
        self.fetch_secret(vault_uri, name, &token).await
    }

    async fn get_secrets(&self, vault_uri: &str, names: &[String]) -> VaultResult<Vec<SecretBundle>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        self.http()?;
        let token = self.token().await?;

        let fetches: Vec<_> = names.iter().map(|name| self.fetch_secret(vault_uri, name, &token)).collect();
        stream::iter(fetches)
            .buffered(MAX_CONCURRENT_FETCHES)
            .try_collect()
            .await
    }
}
