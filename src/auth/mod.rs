//! Authentication module
//!
//! Supports: private API key (query or header) and OAuth bearer tokens
//!
//! Legacy resources take the key as the `api_key` query parameter;
//! revisioned resources take it in the `Authorization` header.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, Credentials, Location};

#[cfg(test)]
mod tests;
