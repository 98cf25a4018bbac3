//! Authenticator implementation
//!
//! Applies the right credentials to each request based on the API
//! generation of the resource being pulled.

use super::types::{AuthConfig, Credentials, Location};
use crate::catalog::ApiGeneration;
use reqwest::RequestBuilder;

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug, Clone)]
pub struct Authenticator {
    legacy: AuthConfig,
    revisioned: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator from account credentials
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            legacy: credentials.auth_for(ApiGeneration::Legacy),
            revisioned: credentials.auth_for(ApiGeneration::Revisioned),
        }
    }

    /// Auth config used for an API generation
    pub fn config_for(&self, api: ApiGeneration) -> &AuthConfig {
        match api {
            ApiGeneration::Legacy => &self.legacy,
            ApiGeneration::Revisioned => &self.revisioned,
        }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder, api: ApiGeneration) -> RequestBuilder {
        apply_config(self.config_for(api), req)
    }
}

fn apply_config(config: &AuthConfig, req: RequestBuilder) -> RequestBuilder {
    match config {
        AuthConfig::ApiKey {
            location,
            header_name,
            query_param,
            prefix,
            value,
        } => {
            let val = format!("{}{}", prefix.as_deref().unwrap_or(""), value);
            match location {
                Location::Header => {
                    let header = header_name.as_deref().unwrap_or("Authorization");
                    req.header(header, val)
                }
                Location::Query => {
                    let param = query_param.as_deref().unwrap_or("api_key");
                    req.query(&[(param, val)])
                }
            }
        }

        AuthConfig::Bearer { token } => req.bearer_auth(token),
    }
}
