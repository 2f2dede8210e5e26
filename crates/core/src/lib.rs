//! # Callwire Core
//!
//! Request execution over an abstract transport.
//!
//! This crate contains:
//! - Transport port interfaces ([`Transport`], [`HttpRequest`], [`RawResponse`])
//! - Resource capabilities ([`Endpoint`], [`PagedEndpoint`])
//! - The [`Executor`]: credentials, retries, timeouts and cancellation
//! - The [`Paginator`]: lazy cursor or page-number iteration
//!
//! ## Architecture Principles
//! - Only depends on `callwire-domain` and `callwire-common`
//! - No HTTP client code; adapters live in `callwire-infra`

pub mod endpoint;
pub mod executor;
pub mod paginator;
pub mod ports;

pub use endpoint::{decode_json, Endpoint, PagedEndpoint};
pub use executor::{Executor, DEFAULT_MAX_PAGES};
pub use paginator::Paginator;
pub use ports::{HttpRequest, RawResponse, Transport, TransportError};
