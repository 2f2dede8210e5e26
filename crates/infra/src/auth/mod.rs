//! OAuth2 token endpoint integration

pub mod token_client;

pub use token_client::OAuthTokenClient;
