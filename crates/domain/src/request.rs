//! Request descriptors
//!
//! A [`RequestDescriptor`] is the immutable description of one logical API
//! call. Resource adapters build one per call; the executor consumes it and
//! may replay it several times while retrying, so everything in it is plain
//! owned data.

use std::fmt;

use serde::Serialize;

use crate::errors::{CallwireError, Result};
use crate::query::QueryParams;

/// HTTP methods used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether replaying the request is safe by HTTP semantics.
    pub const fn is_idempotent(self) -> bool {
        matches!(self, Self::Get | Self::Put | Self::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: HttpMethod,
    path_segments: Vec<String>,
    query: QueryParams,
    body: Option<Vec<u8>>,
    content_type: Option<String>,
    idempotent: bool,
}

impl RequestDescriptor {
    pub fn builder(method: HttpMethod) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::new(method)
    }

    pub fn get() -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Get)
    }

    pub fn post() -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Post)
    }

    pub fn patch() -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Patch)
    }

    pub fn put() -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Put)
    }

    pub fn delete() -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Delete)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Percent-encoded path segments.
    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    /// `/seg1/seg2/...` built from the encoded segments.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.path_segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn is_idempotent(&self) -> bool {
        self.idempotent
    }

    /// Full URL relative to `base_url` (trailing slashes on the base are ignored).
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path());
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&self.query.to_query_string());
        }
        url
    }

    /// Re-check the invariants the builder establishes.
    ///
    /// # Errors
    /// Returns a validation error if the descriptor has no path, an empty or
    /// unencoded segment, or a body without a content type.
    pub fn validate(&self) -> Result<()> {
        if self.path_segments.is_empty() {
            return Err(CallwireError::validation("path", "request has no path segments"));
        }
        if let Some(bad) =
            self.path_segments.iter().find(|s| s.is_empty() || s.contains(['/', '?', '#', ' ']))
        {
            return Err(CallwireError::validation(
                "path",
                format!("segment `{bad}` is empty or not percent-encoded"),
            ));
        }
        if self.body.is_some() && self.content_type.is_none() {
            return Err(CallwireError::validation("body", "body present without content type"));
        }
        Ok(())
    }
}

/// Builder for [`RequestDescriptor`]
///
/// Input problems are recorded as they happen and reported by
/// [`build`](Self::build), so a chain of calls needs one `?` at the end.
#[derive(Debug)]
pub struct RequestDescriptorBuilder {
    method: HttpMethod,
    path_segments: Vec<String>,
    query: QueryParams,
    body: Option<Vec<u8>>,
    content_type: Option<String>,
    idempotent: Option<bool>,
    error: Option<CallwireError>,
}

impl RequestDescriptorBuilder {
    fn new(method: HttpMethod) -> Self {
        Self {
            method,
            path_segments: Vec::new(),
            query: QueryParams::new(),
            body: None,
            content_type: None,
            idempotent: None,
            error: None,
        }
    }

    fn fail(&mut self, error: CallwireError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Append a literal path segment (e.g. `"users"`).
    pub fn segment(mut self, segment: impl AsRef<str>) -> Self {
        let segment = segment.as_ref();
        if segment.is_empty() {
            self.fail(CallwireError::validation("path", "empty path segment"));
        } else {
            self.path_segments.push(urlencoding::encode(segment).into_owned());
        }
        self
    }

    /// Append a caller-supplied identifier segment; empty or blank values
    /// are reported against `parameter`.
    pub fn id_segment(mut self, parameter: &str, value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        if value.trim().is_empty() {
            self.fail(CallwireError::validation(parameter, "identifier must not be empty"));
        } else {
            self.path_segments.push(urlencoding::encode(value).into_owned());
        }
        self
    }

    /// Replace the query parameters.
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Edit the query parameters in place.
    pub fn with_query(mut self, edit: impl FnOnce(&mut QueryParams)) -> Self {
        edit(&mut self.query);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.content_type = Some(content_type.into());
        self
    }

    /// Serialize `payload` as the JSON body.
    pub fn json_body<T: Serialize + ?Sized>(mut self, payload: &T) -> Self {
        match serde_json::to_vec(payload) {
            Ok(bytes) => {
                self.body = Some(bytes);
                self.content_type = Some("application/json".to_string());
            }
            Err(err) => self.fail(CallwireError::validation("body", err.to_string())),
        }
        self
    }

    /// Override the idempotency implied by the method.
    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = Some(idempotent);
        self
    }

    /// # Errors
    /// Returns the first validation error recorded while building.
    pub fn build(self) -> Result<RequestDescriptor> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let descriptor = RequestDescriptor {
            idempotent: self.idempotent.unwrap_or_else(|| self.method.is_idempotent()),
            method: self.method,
            path_segments: self.path_segments,
            query: self.query,
            body: self.body,
            content_type: self.content_type,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn segments_are_encoded_exactly_once() {
        let request = RequestDescriptor::get()
            .segment("users")
            .id_segment("user_id", "jane doe@example.com")
            .segment("contacts")
            .build()
            .unwrap();

        assert_eq!(request.path(), "/users/jane%20doe%40example.com/contacts");
        assert_eq!(request.path_segments()[1], "jane%20doe%40example.com");
    }

    #[test]
    fn empty_identifier_fails_with_parameter_name() {
        let err = RequestDescriptor::delete()
            .segment("groups")
            .id_segment("group_id", "  ")
            .build()
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.parameter(), Some("group_id"));
    }

    #[test]
    fn url_joins_base_path_and_query() {
        let request = RequestDescriptor::get()
            .segment("contacts")
            .with_query(|q| {
                q.append("page_size", 5_u32).append("next_page_token", "abc");
            })
            .build()
            .unwrap();

        assert_eq!(
            request.url("https://api.example.test/v2/"),
            "https://api.example.test/v2/contacts?page_size=5&next_page_token=abc"
        );
    }

    #[test]
    fn json_body_sets_content_type() {
        let request = RequestDescriptor::patch()
            .segment("users")
            .id_segment("user_id", "u1")
            .json_body(&json!({ "first_name": "Ada" }))
            .build()
            .unwrap();

        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(request.body(), Some(br#"{"first_name":"Ada"}"#.as_slice()));
        assert!(!request.is_idempotent());
    }

    #[test]
    fn idempotency_defaults_follow_method() {
        let get = RequestDescriptor::get().segment("a").build().unwrap();
        let post = RequestDescriptor::post().segment("a").build().unwrap();
        let forced = RequestDescriptor::post().segment("a").idempotent(true).build().unwrap();

        assert!(get.is_idempotent());
        assert!(!post.is_idempotent());
        assert!(forced.is_idempotent());
    }

    #[test]
    fn descriptor_without_path_is_rejected() {
        let err = RequestDescriptor::get().build().unwrap_err();
        assert_eq!(err.parameter(), Some("path"));
    }
}
