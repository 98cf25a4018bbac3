//! Auth configuration types

use crate::catalog::ApiGeneration;
use serde::{Deserialize, Serialize};

/// Location for API key placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Place in HTTP header
    #[default]
    Header,
    /// Place in query parameter
    Query,
}

/// Authentication applied to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// API Key authentication (header or query)
    ApiKey {
        /// Where to place the API key
        location: Location,
        /// Header name (for header location)
        header_name: Option<String>,
        /// Query parameter name (for query location)
        query_param: Option<String>,
        /// Prefix to add before the value (e.g., "Klaviyo-API-Key ")
        prefix: Option<String>,
        /// The API key value
        value: String,
    },

    /// Bearer token authentication
    Bearer {
        /// The bearer token
        token: String,
    },
}

/// Account credentials from the tap config
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Private API key, or an OAuth access token when `oauth` is set
    pub api_key: String,
    /// Send the key as a bearer token on revisioned resources
    pub oauth: bool,
}

impl Credentials {
    /// Create credentials for a private API key
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: key.into(),
            oauth: false,
        }
    }

    /// Create credentials for an OAuth access token
    pub fn oauth(token: impl Into<String>) -> Self {
        Self {
            api_key: token.into(),
            oauth: true,
        }
    }

    /// Auth scheme for one generation of the API
    pub fn auth_for(&self, api: ApiGeneration) -> AuthConfig {
        match api {
            ApiGeneration::Legacy => AuthConfig::ApiKey {
                location: Location::Query,
                header_name: None,
                query_param: Some("api_key".to_string()),
                prefix: None,
                value: self.api_key.clone(),
            },
            ApiGeneration::Revisioned if self.oauth => AuthConfig::Bearer {
                token: self.api_key.clone(),
            },
            ApiGeneration::Revisioned => AuthConfig::ApiKey {
                location: Location::Header,
                header_name: Some("Authorization".to_string()),
                query_param: None,
                prefix: Some("Klaviyo-API-Key ".to_string()),
                value: self.api_key.clone(),
            },
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("oauth", &self.oauth)
            .finish()
    }
}
