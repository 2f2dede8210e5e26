//! # Callwire Infrastructure
//!
//! Adapters that connect the callwire core to the outside world.
//!
//! This crate contains:
//! - The reqwest HTTP [`Transport`](callwire_core::Transport)
//! - The OAuth2 token endpoint client
//! - Configuration loading from `.env`, environment and files
//! - Tracing subscriber setup
//! - Reference resource adapters built on the core
//!
//! ## Architecture
//! - Implements traits defined in `callwire-core` and `callwire-common`
//! - Contains all "impure" code (network, environment, filesystem)

pub mod auth;
pub mod client;
pub mod config;
pub mod http;
pub mod observability;
pub mod resources;

// Re-export commonly used items
pub use auth::OAuthTokenClient;
pub use client::Client;
pub use http::ReqwestTransport;
pub use observability::init_tracing;
