//! # Callwire Domain
//!
//! Value types shared by every layer of callwire.
//!
//! This crate contains:
//! - The caller-facing error taxonomy ([`CallwireError`])
//! - Query encoding and the [`wire_enum!`] macro
//! - Request descriptors, page windows, page results and date windows
//! - Credentials and configuration structures
//!
//! ## Architecture
//! - No dependencies on other callwire crates
//! - No I/O: every constructor validates eagerly and returns `Result`

pub mod config;
pub mod credential;
pub mod errors;
pub mod macros;
pub mod pagination;
pub mod query;
pub mod request;
pub mod window;

// Re-export commonly used items
pub use config::*;
pub use credential::Credential;
pub use errors::*;
pub use pagination::{decode_list_page, PageResult, PageWindow, PaginationMode};
pub use query::{DateGranularity, ListStyle, QueryParams, QueryValue, WireEnum};
pub use request::{HttpMethod, RequestDescriptor, RequestDescriptorBuilder};
pub use window::DateWindow;

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
