//! OAuth2 token endpoint client
//!
//! Exchanges client credentials for an access token. Supports the
//! `client_credentials` grant and the server-to-server
//! `account_credentials` grant (scoped to one account id). The client
//! authenticates with HTTP Basic auth.

use std::time::Duration;

use async_trait::async_trait;
use callwire_common::auth::CredentialSource;
use callwire_domain::config::{OAuthConfig, OAuthGrant};
use callwire_domain::{CallwireError, Credential, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Token endpoint success body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
}

/// Token endpoint error body (RFC 6749 §5.2)
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Fetches credentials from an OAuth2 token endpoint
#[derive(Clone)]
pub struct OAuthTokenClient {
    client: Client,
    config: OAuthConfig,
}

impl std::fmt::Debug for OAuthTokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokenClient")
            .field("token_url", &self.config.token_url)
            .field("client_id", &self.config.client_id)
            .field("grant", &self.config.grant)
            .finish_non_exhaustive()
    }
}

impl OAuthTokenClient {
    /// # Errors
    /// Returns [`CallwireError::Config`] if the HTTP client cannot be built.
    pub fn new(config: OAuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .no_proxy()
            .build()
            .map_err(|e| CallwireError::Config(format!("Failed to build token client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Reuse an existing reqwest client (connection pool). Token requests
    /// still time out after `config.timeout_secs`.
    pub fn with_client(client: Client, config: OAuthConfig) -> Self {
        Self { client, config }
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = match &self.config.grant {
            OAuthGrant::ClientCredentials => vec![("grant_type", "client_credentials".to_string())],
            OAuthGrant::AccountCredentials { account_id } => vec![
                ("grant_type", "account_credentials".to_string()),
                ("account_id", account_id.clone()),
            ],
        };
        if !self.config.scopes.is_empty() {
            form.push(("scope", self.config.scopes.join(" ")));
        }
        form
    }

    /// Request a new access token.
    ///
    /// # Errors
    /// Returns [`CallwireError::Auth`] for network failures, non-2xx
    /// responses (with the status) and malformed token bodies.
    #[instrument(skip(self), fields(token_url = %self.config.token_url))]
    pub async fn request_token(&self) -> Result<Credential> {
        debug!("requesting access token");

        let response = self
            .client
            .post(&self.config.token_url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&self.form())
            .send()
            .await
            .map_err(|e| CallwireError::auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {description}", err.error),
                    None => err.error,
                },
                Err(_) => format!("token endpoint returned {status}"),
            };
            return Err(CallwireError::Auth { message, status: Some(status.as_u16()) });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CallwireError::auth(format!("invalid token response: {e}")))?;

        if let Some(kind) = token.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                return Err(CallwireError::auth(format!("unsupported token type `{kind}`")));
            }
        }

        let credential =
            Credential::from_expires_in(token.access_token, token.expires_in, token.scope.as_deref())?;
        info!(expires_in = token.expires_in, "access token issued");
        Ok(credential)
    }
}

#[async_trait]
impl CredentialSource for OAuthTokenClient {
    async fn fetch_credential(&self) -> Result<Credential> {
        self.request_token().await
    }
}
