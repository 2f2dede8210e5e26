//! Credential cache with single-flight refresh
//!
//! Manages the access-token lifecycle for every request issued by a client:
//! - Returns the cached credential while it is usable (`now < expires_at - skew`)
//! - Starts at most one refresh at a time; concurrent callers wait on it
//! - Shares the refresh result, success or failure, with every waiter
//! - Lets a caller discard a credential the server rejected
//!
//! The refresh itself runs on a spawned task, so a waiter that gives up
//! (cancellation) never aborts the fetch other waiters depend on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use callwire_domain::{CallwireError, Credential, Result};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Anything that can mint a fresh credential (typically an OAuth token endpoint)
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Fetch a new credential.
    ///
    /// # Errors
    /// Returns [`CallwireError::Auth`] when the credential cannot be obtained.
    async fn fetch_credential(&self) -> Result<Credential>;
}

/// Refresh result broadcast to waiters; `None` until the refresh settles.
type RefreshSlot = Option<Result<Credential>>;

#[derive(Default)]
struct TokenState {
    credential: Option<Credential>,
    inflight: Option<watch::Receiver<RefreshSlot>>,
}

/// Observable state of the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// No usable credential: none fetched yet, discarded, or inside the
    /// expiry skew. The next acquire refreshes.
    Empty,
    /// A credential is cached and usable.
    Valid,
    /// A refresh is in flight.
    Refreshing,
}

/// Caches one credential and refreshes it on demand
///
/// Cheap to clone; clones share the same cache and in-flight refresh.
#[derive(Clone)]
pub struct TokenProvider {
    source: Arc<dyn CredentialSource>,
    skew: Duration,
    state: Arc<Mutex<TokenState>>,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider").field("skew", &self.skew).finish_non_exhaustive()
    }
}

impl TokenProvider {
    pub fn new(source: Arc<dyn CredentialSource>, skew: Duration) -> Self {
        Self { source, skew, state: Arc::new(Mutex::new(TokenState::default())) }
    }

    pub fn skew(&self) -> Duration {
        self.skew
    }

    /// Return a usable credential, refreshing if necessary.
    ///
    /// If a refresh is already in flight this waits for it instead of
    /// starting another one.
    ///
    /// # Errors
    /// - [`CallwireError::Auth`] if the refresh failed (shared by all waiters)
    /// - [`CallwireError::Cancelled`] if `cancel` fired while waiting; the
    ///   refresh keeps running for other waiters
    #[instrument(skip_all, level = "debug")]
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<Credential> {
        if cancel.is_cancelled() {
            return Err(CallwireError::Cancelled);
        }

        let mut rx = {
            let mut state = self.state.lock().await;
            if let Some(credential) = state.credential.as_ref().filter(|c| c.is_usable(self.skew)) {
                return Ok(credential.clone());
            }
            match &state.inflight {
                Some(rx) => {
                    debug!("joining in-flight credential refresh");
                    rx.clone()
                }
                None => self.start_refresh(&mut state),
            }
        };

        // The watch borrow is a lock guard; copy the slot out before any await.
        let settled = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("credential wait cancelled");
                return Err(CallwireError::Cancelled);
            }
            settled = rx.wait_for(Option::is_some) => settled.map(|slot| (*slot).clone()),
        };

        match settled {
            Ok(Some(result)) => result,
            Ok(None) => Err(CallwireError::auth("credential refresh produced no result")),
            Err(_) => {
                self.clear_abandoned_refresh().await;
                Err(CallwireError::auth("credential refresh was aborted"))
            }
        }
    }

    /// Discard `stale` if it is still the cached credential.
    ///
    /// Used after the server rejects a credential with 401. If another caller
    /// already replaced it, the newer credential is kept.
    pub async fn invalidate(&self, stale: &Credential) {
        let mut state = self.state.lock().await;
        if state.credential.as_ref().is_some_and(|current| current.value() == stale.value()) {
            info!("discarding rejected credential");
            state.credential = None;
        }
    }

    /// Discard whatever is cached and acquire a fresh credential.
    ///
    /// # Errors
    /// Same as [`TokenProvider::acquire`].
    pub async fn force_refresh(&self, cancel: &CancellationToken) -> Result<Credential> {
        {
            let mut state = self.state.lock().await;
            if state.inflight.is_none() {
                state.credential = None;
            }
        }
        self.acquire(cancel).await
    }

    /// Cached credential without refreshing (may be inside the skew).
    pub async fn current(&self) -> Option<Credential> {
        self.state.lock().await.credential.clone()
    }

    pub async fn status(&self) -> TokenStatus {
        let state = self.state.lock().await;
        if state.inflight.is_some() {
            return TokenStatus::Refreshing;
        }
        match &state.credential {
            Some(c) if c.is_usable(self.skew) => TokenStatus::Valid,
            _ => TokenStatus::Empty,
        }
    }

    /// Spawn the refresh task and register it as in flight.
    ///
    /// Must be called with the state lock held.
    fn start_refresh(&self, state: &mut TokenState) -> watch::Receiver<RefreshSlot> {
        let (tx, rx) = watch::channel(None);
        state.inflight = Some(rx.clone());

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.state);
        debug!("starting credential refresh");

        tokio::spawn(async move {
            let result = source.fetch_credential().await;

            {
                let mut state = shared.lock().await;
                match &result {
                    Ok(credential) => {
                        info!(expires_at = %credential.expires_at(), "credential refreshed");
                        state.credential = Some(credential.clone());
                    }
                    Err(e) => warn!(error = %e, "credential refresh failed"),
                }
                state.inflight = None;
            }

            // No receivers left is fine: everyone gave up waiting.
            let _ = tx.send(Some(result));
        });

        rx
    }

    /// Forget a refresh whose task died without reporting.
    async fn clear_abandoned_refresh(&self) {
        let mut state = self.state.lock().await;
        if state.inflight.as_ref().is_some_and(|rx| rx.has_changed().is_err()) {
            state.inflight = None;
        }
    }
}
