//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{CallwireError, Result};

/// Default `api.base_url`; override it through the config file or
/// `CALLWIRE_BASE_URL` for another deployment or a mock server.
pub const DEFAULT_BASE_URL: &str = "https://api.zoom.us/v2";

/// Default `oauth.token_url`; `CALLWIRE_TOKEN_URL` overrides it.
pub const DEFAULT_TOKEN_URL: &str = "https://zoom.us/oauth/token";

/// Client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub oauth: OAuthConfig,
    pub retry: RetryConfig,
    pub token: TokenConfig,
    pub pagination: PaginationConfig,
}

/// API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-attempt timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: concat!("callwire/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// OAuth2 grant used to obtain access tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OAuthGrant {
    #[default]
    ClientCredentials,
    /// Server-to-server grant scoped to one account.
    AccountCredentials { account_id: String },
}

/// Token endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OAuthConfig {
    pub token_url: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub grant: OAuthGrant,
    pub scopes: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            grant: OAuthGrant::default(),
            scopes: Vec::new(),
            timeout_secs: 30,
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per logical call, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Budget for one logical call across all attempts and waits.
    pub deadline_secs: u64,
    /// Retry POST/PATCH on 5xx and network failures.
    pub retry_non_idempotent: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            deadline_secs: 120,
            retry_non_idempotent: true,
        }
    }
}

/// Credential cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TokenConfig {
    /// Treat a credential as expired this long before it actually expires.
    pub expiry_skew_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self { expiry_skew_secs: 60 }
    }
}

impl TokenConfig {
    pub fn skew(&self) -> Duration {
        Duration::from_secs(self.expiry_skew_secs)
    }
}

/// Pagination guard configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaginationConfig {
    pub max_pages: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { max_pages: 1000 }
    }
}

impl ClientConfig {
    /// # Errors
    /// Returns [`CallwireError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url)
            .map_err(|e| CallwireError::Config(format!("Invalid api.base_url: {e}")))?;
        Url::parse(&self.oauth.token_url)
            .map_err(|e| CallwireError::Config(format!("Invalid oauth.token_url: {e}")))?;

        if self.oauth.client_id.trim().is_empty() {
            return Err(CallwireError::Config("oauth.client_id is required".to_string()));
        }
        if self.oauth.client_secret.trim().is_empty() {
            return Err(CallwireError::Config("oauth.client_secret is required".to_string()));
        }
        if let OAuthGrant::AccountCredentials { account_id } = &self.oauth.grant {
            if account_id.trim().is_empty() {
                return Err(CallwireError::Config("oauth.grant.account_id is required".to_string()));
            }
        }
        if self.retry.max_attempts == 0 {
            return Err(CallwireError::Config("retry.max_attempts must be at least 1".to_string()));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(CallwireError::Config(
                "retry.base_delay_ms must not exceed retry.max_delay_ms".to_string(),
            ));
        }
        if self.pagination.max_pages == 0 {
            return Err(CallwireError::Config("pagination.max_pages must be at least 1".to_string()));
        }
        if self.api.timeout_secs == 0 {
            return Err(CallwireError::Config("api.timeout_secs must be at least 1".to_string()));
        }
        if self.oauth.timeout_secs == 0 {
            return Err(CallwireError::Config("oauth.timeout_secs must be at least 1".to_string()));
        }
        if self.retry.deadline_secs == 0 {
            return Err(CallwireError::Config("retry.deadline_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}
