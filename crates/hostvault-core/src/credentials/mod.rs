//! Credential providers for authenticating against a vault
//!
//! Credentials are injected into the registrar rather than constructed by it,
//! so tests can use `StaticTokenCredential` without an identity service.

mod traits;
mod static_token;
mod managed_identity;

pub use traits::{AccessToken, CredentialError, CredentialResult, SharedCredential, TokenCredential};
pub use static_token::StaticTokenCredential;
pub use managed_identity::{ManagedIdentityCredential, IMDS_ENDPOINT};
