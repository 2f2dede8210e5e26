//! Resource capabilities
//!
//! A resource adapter is a plain struct that knows how to build its request
//! and decode its response. The executor supplies everything else.

use callwire_domain::{
    decode_list_page, CallwireError, PageResult, PageWindow, PaginationMode, RequestDescriptor,
    Result,
};
use serde::de::DeserializeOwned;

use crate::ports::RawResponse;

/// A single (non-paged) call
pub trait Endpoint {
    type Output;

    /// # Errors
    /// Returns a validation error for malformed caller input.
    fn build_request(&self) -> Result<RequestDescriptor>;

    /// # Errors
    /// Returns [`CallwireError::Decode`] if the body does not match `Output`.
    fn decode_response(&self, response: &RawResponse) -> Result<Self::Output>;
}

/// A list call that returns one page per request
pub trait PagedEndpoint {
    type Record: DeserializeOwned;

    /// Key of the records array inside the list envelope.
    fn records_key(&self) -> &str;

    fn pagination_mode(&self) -> PaginationMode {
        PaginationMode::Cursor
    }

    /// # Errors
    /// Returns a validation error for malformed caller input.
    fn build_page_request(&self, window: &PageWindow) -> Result<RequestDescriptor>;

    /// Decode one page; the default reads the standard list envelope.
    ///
    /// # Errors
    /// Returns [`CallwireError::Decode`] for malformed envelopes or records.
    fn decode_page(&self, response: &RawResponse) -> Result<PageResult<Self::Record>> {
        decode_list_page(&response.body, self.records_key())
    }
}

/// Decode a JSON body, mapping failures to [`CallwireError::Decode`].
///
/// # Errors
/// Returns [`CallwireError::Decode`] if the body is not valid JSON for `T`.
pub fn decode_json<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    serde_json::from_slice(&response.body)
        .map_err(|e| CallwireError::Decode(format!("status {}: {e}", response.status)))
}
