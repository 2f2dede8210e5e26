//! Access-token caching
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenProvider  │  cache + single-flight refresh
//! └────────┬────────┘
//!          │
//!          └──► CredentialSource  (token endpoint, mocks in tests)
//! ```

pub mod token_provider;

pub use token_provider::{CredentialSource, TokenProvider, TokenStatus};
