//! Shared fixtures for infra integration tests
#![allow(dead_code)]

use callwire_domain::config::{ClientConfig, OAuthGrant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth/token";

/// Config pointing both the API and the token endpoint at `server`, with
/// short retry delays so failing tests stay fast.
pub fn config_for(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.api.base_url = format!("{}/v2", server.uri());
    config.api.timeout_secs = 5;
    config.oauth.token_url = format!("{}{TOKEN_PATH}", server.uri());
    config.oauth.client_id = "client".to_string();
    config.oauth.client_secret = "secret".to_string();
    config.oauth.grant = OAuthGrant::AccountCredentials { account_id: "acct-1".to_string() };
    config.retry.base_delay_ms = 10;
    config.retry.max_delay_ms = 50;
    config.retry.deadline_secs = 10;
    config
}

pub fn token_body(token: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": 3599,
        "scope": "user:read:admin"
    })
}

/// Token endpoint that always issues `token`, expected `times` times.
pub async fn mount_token(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
        .expect(times)
        .mount(server)
        .await;
}
