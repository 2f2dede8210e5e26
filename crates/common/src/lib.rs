//! Runtime building blocks shared by callwire crates.
//!
//! - [`auth`]: credential cache with single-flight refresh
//! - [`resilience`]: retry policy and `Retry-After` parsing

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod resilience;

pub use auth::{CredentialSource, TokenProvider, TokenStatus};
pub use resilience::{Backoff, Outcome, RetryDecision, RetryPolicy, RetryState};
