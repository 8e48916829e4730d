//! URI validation for vault endpoints

use thiserror::Error;
use url::Url;

/// The only scheme accepted for a vault endpoint
pub const SECURE_SCHEME: &str = "https";

/// Raised when an endpoint string cannot be used to reach a vault
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidEndpointFormat {
    #[error("'{uri}' is not a valid uri: {reason}")]
    NotAUri { uri: String, reason: String },

    #[error("'{uri}' does not have Transport Layer Security (i.e. it is not https)")]
    InsecureScheme { uri: String, scheme: String },
}

impl InvalidEndpointFormat {
    /// The offending input, exactly as supplied
    pub fn uri(&self) -> &str {
        match self {
            Self::NotAUri { uri, .. } | Self::InsecureScheme { uri, .. } => uri,
        }
    }
}

/// An endpoint that passed validation
///
/// `url` is `None` when the scheme is `https` but the authority could not be
/// parsed. Such endpoints are accepted here; the vault client reports them
/// when it first tries to use them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEndpoint {
    uri: String,
    url: Option<Url>,
}

impl VaultEndpoint {
    /// The endpoint as originally supplied
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}

impl std::fmt::Display for VaultEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Check that `uri` is an absolute `https` URI
///
/// Returns `Ok(true)` on success. Never returns `Ok(false)`: every rejection
/// carries the reason.
///
/// # Example
///
/// ```
/// use hostvault_core::endpoint::{validate_endpoint, InvalidEndpointFormat};
///
/// assert_eq!(validate_endpoint("https://my-vault.vault.example.com"), Ok(true));
/// assert!(matches!(
///     validate_endpoint("http://my-vault.vault.example.com"),
///     Err(InvalidEndpointFormat::InsecureScheme { .. })
/// ));
/// ```
pub fn validate_endpoint(uri: &str) -> Result<bool, InvalidEndpointFormat> {
    parse_endpoint(uri).map(|_| true)
}

/// Validate `uri` and keep the parsed form
pub fn parse_endpoint(uri: &str) -> Result<VaultEndpoint, InvalidEndpointFormat> {
    let (scheme, url) = match Url::parse(uri) {
        Ok(url) => (url.scheme().to_string(), Some(url)),
        Err(err) if is_authority_error(err) => match absolute_scheme(uri) {
            Some(scheme) => (scheme, None),
            None => return Err(not_a_uri(uri, err)),
        },
        Err(err) => return Err(not_a_uri(uri, err)),
    };

    if scheme != SECURE_SCHEME {
        return Err(InvalidEndpointFormat::InsecureScheme {
            uri: uri.to_string(),
            scheme,
        });
    }

    Ok(VaultEndpoint {
        uri: uri.to_string(),
        url,
    })
}

fn not_a_uri(uri: &str, err: url::ParseError) -> InvalidEndpointFormat {
    InvalidEndpointFormat::NotAUri {
        uri: uri.to_string(),
        reason: err.to_string(),
    }
}

/// Errors raised after a scheme was recognised, while parsing host or port
fn is_authority_error(err: url::ParseError) -> bool {
    matches!(
        err,
        url::ParseError::EmptyHost
            | url::ParseError::IdnaError
            | url::ParseError::InvalidPort
            | url::ParseError::InvalidIpv4Address
            | url::ParseError::InvalidIpv6Address
            | url::ParseError::InvalidDomainCharacter
    )
}

/// RFC 3986 scheme of an absolute URI, lower-cased
fn absolute_scheme(uri: &str) -> Option<String> {
    let (scheme, _) = uri.trim().split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some(scheme.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_endpoint_is_valid() {
        assert_eq!(validate_endpoint("https://my-vault.vault.example.com"), Ok(true));
    }

    #[test]
    fn test_path_and_query_are_accepted() {
        let endpoint = parse_endpoint("https://vault.example.com/some/path?query=1").unwrap();
        let url = endpoint.url().unwrap();
        assert_eq!(url.path(), "/some/path");
        assert_eq!(url.query(), Some("query=1"));
        assert_eq!(endpoint.as_str(), "https://vault.example.com/some/path?query=1");
    }

    #[test]
    fn test_http_endpoint_is_insecure() {
        let err = validate_endpoint("http://my-vault.vault.example.com").unwrap_err();
        assert!(matches!(
            &err,
            InvalidEndpointFormat::InsecureScheme { scheme, .. } if scheme == "http"
        ));
        assert!(err.to_string().contains("Transport Layer Security"));
        assert_eq!(err.uri(), "http://my-vault.vault.example.com");
    }

    #[test]
    fn test_other_schemes_are_insecure() {
        for uri in ["ftp://vault.example.com", "mailto:ops@example.com", "wss://vault.example.com"] {
            assert!(
                matches!(validate_endpoint(uri), Err(InvalidEndpointFormat::InsecureScheme { .. })),
                "{uri} should be rejected as insecure"
            );
        }
    }

    #[test]
    fn test_free_text_is_not_a_uri() {
        let err = validate_endpoint("not a uri").unwrap_err();
        assert!(matches!(err, InvalidEndpointFormat::NotAUri { .. }));
        assert!(err.to_string().starts_with("'not a uri' is not a valid uri"));
    }

    #[test]
    fn test_empty_string_is_not_a_uri() {
        assert!(matches!(
            validate_endpoint(""),
            Err(InvalidEndpointFormat::NotAUri { .. })
        ));
    }

    #[test]
    fn test_relative_path_is_not_a_uri() {
        assert!(matches!(
            validate_endpoint("/vault/secret"),
            Err(InvalidEndpointFormat::NotAUri { .. })
        ));
    }

    #[test]
    fn test_scheme_is_compared_in_canonical_form() {
        assert_eq!(validate_endpoint("HTTPS://vault.example.com"), Ok(true));
        assert!(validate_endpoint("HTTP://vault.example.com").is_err());
    }

    #[test]
    fn test_https_with_malformed_authority_is_accepted() {
        let endpoint = parse_endpoint("https://vault.example.com:99999").unwrap();
        assert!(endpoint.url().is_none());
        assert_eq!(validate_endpoint("https://bad host.example.com"), Ok(true));
    }

    #[test]
    fn test_http_with_malformed_authority_is_still_insecure() {
        assert!(matches!(
            validate_endpoint("http://vault.example.com:99999"),
            Err(InvalidEndpointFormat::InsecureScheme { .. })
        ));
    }

    #[test]
    fn test_absolute_scheme() {
        assert_eq!(absolute_scheme("HTTPS://x"), Some("https".to_string()));
        assert_eq!(absolute_scheme("svn+ssh://x"), Some("svn+ssh".to_string()));
        assert_eq!(absolute_scheme("1abc://x"), None);
        assert_eq!(absolute_scheme("no scheme here"), None);
    }
}
