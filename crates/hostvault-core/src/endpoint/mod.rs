//! Vault endpoint validation
//!
//! An endpoint must be an absolute URI using the `https` scheme. Validation is
//! purely syntactic: nothing here contacts the vault or negotiates TLS.

mod validate;

pub use validate::{
    parse_endpoint, validate_endpoint, InvalidEndpointFormat, VaultEndpoint, SECURE_SCHEME,
};
