//! OAuth access credentials

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::{CallwireError, Result};

/// A bearer access token and its lifetime
///
/// Never mutated: a refresh produces a new `Credential` that replaces the
/// old one wholesale. The token value is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    value: String,
    expires_at: DateTime<Utc>,
    scope: BTreeSet<String>,
}

impl Credential {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>, scope: BTreeSet<String>) -> Self {
        Self { value: value.into(), expires_at, scope }
    }

    /// Build from a token response: lifetime in seconds and a space-separated scope.
    ///
    /// # Errors
    /// Returns [`CallwireError::Auth`] if the lifetime does not fit a timestamp.
    pub fn from_expires_in(
        value: impl Into<String>,
        expires_in_secs: i64,
        scope: Option<&str>,
    ) -> Result<Self> {
        let expires_at = chrono::Duration::try_seconds(expires_in_secs)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| CallwireError::auth(format!("token lifetime out of range: {expires_in_secs}s")))?;
        let scope = scope
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
        Ok(Self::new(value, expires_at, scope))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn scope(&self) -> &BTreeSet<String> {
        &self.scope
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }

    /// Usable iff `now < expires_at - skew`.
    pub fn is_usable(&self, skew: Duration) -> bool {
        self.is_usable_at(Utc::now(), skew)
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        let skew = chrono::Duration::from_std(skew).unwrap_or(chrono::Duration::MAX);
        match self.expires_at.checked_sub_signed(skew) {
            Some(deadline) => now < deadline,
            None => false,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}
