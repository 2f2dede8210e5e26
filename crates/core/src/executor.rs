//! Request executor
//!
//! Turns one [`RequestDescriptor`] into one successful [`RawResponse`] or a
//! terminal [`CallwireError`]:
//! 1. validate the descriptor
//! 2. acquire a credential from the [`TokenProvider`]
//! 3. send with `Authorization: Bearer ...` under a per-attempt timeout
//! 4. classify the outcome; wait and resend while the [`RetryPolicy`] allows
//!
//! A 401 discards the rejected credential and retries once with a fresh one.
//! Every send, including that one, counts against the attempt cap, and no
//! attempt may outlive the call deadline.

use std::sync::Arc;

use callwire_common::auth::TokenProvider;
use callwire_common::resilience::{parse_retry_after, Outcome, RetryDecision, RetryPolicy, RetryState};
use callwire_domain::config::ApiConfig;
use callwire_domain::{
    CallwireError, Credential, PageResult, PageWindow, RequestDescriptor, Result, TransientKind,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::endpoint::{decode_json, Endpoint, PagedEndpoint};
use crate::paginator::Paginator;
use crate::ports::{HttpRequest, RawResponse, Transport, TransportError};

/// Default bound on pages fetched by one paginator.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Longest error body carried into a transient error message.
const MESSAGE_BODY_LIMIT: usize = 512;

/// Executes requests with credentials, retries and cancellation
///
/// Cheap to clone; clones share the transport and token cache.
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    tokens: TokenProvider,
    policy: RetryPolicy,
    api: ApiConfig,
    max_pages: u32,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("base_url", &self.api.base_url)
            .field("policy", &self.policy)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

/// What one attempt produced, before the retry decision.
enum Attempt {
    Done(RawResponse),
    Unauthorized(RawResponse),
    Failed { outcome: Outcome, message: String, response: Option<RawResponse> },
}

impl Executor {
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: TokenProvider,
        policy: RetryPolicy,
        api: ApiConfig,
    ) -> Self {
        Self { transport, tokens, policy, api, max_pages: DEFAULT_MAX_PAGES }
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn tokens(&self) -> &TokenProvider {
        &self.tokens
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    /// Execute one logical call and return the first 2xx response.
    ///
    /// # Errors
    /// - [`CallwireError::Validation`] for a malformed descriptor (no I/O)
    /// - [`CallwireError::Auth`] if no credential could be obtained, or a
    ///   freshly refreshed credential was rejected with 401
    /// - [`CallwireError::Permanent`] for any other non-retryable status
    /// - [`CallwireError::Transient`] once retries or the deadline run out
    /// - [`CallwireError::Cancelled`] if `cancel` fires at any wait
    #[instrument(
        skip(self, request, cancel),
        fields(method = request.method().as_str(), path = %request.path())
    )]
    pub async fn execute(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<RawResponse> {
        request.validate()?;

        let url = request.url(&self.api.base_url);
        let mut state = self.policy.start();
        let mut credential = self.tokens.acquire(cancel).await?;
        let mut refreshed = false;

        loop {
            debug!(attempt = state.attempt(), "sending request");
            let timeout = self.api.timeout().min(state.remaining());
            match self.attempt(request, &url, &credential, timeout, cancel).await? {
                Attempt::Done(response) => {
                    debug!(status = response.status, attempts = state.attempts_made(), "request succeeded");
                    return Ok(response);
                }
                Attempt::Unauthorized(response) => {
                    let reason = if refreshed {
                        Some("credential rejected after refresh")
                    } else if state.attempts_made() >= self.policy.max_attempts() {
                        Some("credential rejected with no attempts left")
                    } else {
                        None
                    };
                    if let Some(reason) = reason {
                        warn!(attempts = state.attempts_made(), "{reason}");
                        return Err(CallwireError::Auth {
                            message: format!("{reason}: {}", response.text()),
                            status: Some(401),
                        });
                    }
                    info!("credential rejected, refreshing");
                    refreshed = true;
                    self.tokens.invalidate(&credential).await;
                    credential = self.tokens.acquire(cancel).await?;
                    state.record_error("HTTP 401");
                    state.advance();
                }
                Attempt::Failed { outcome, message, response } => {
                    self.after_failure(&mut state, request, outcome, message, response, cancel).await?;
                }
            }
        }
    }

    /// Execute and decode a JSON body.
    ///
    /// # Errors
    /// As [`Executor::execute`], plus [`CallwireError::Decode`].
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let response = self.execute(request, cancel).await?;
        decode_json(&response)
    }

    /// Execute a mutation whose success carries no payload (typically 204).
    ///
    /// # Errors
    /// As [`Executor::execute`].
    pub async fn execute_no_content(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let response = self.execute(request, cancel).await?;
        if !response.body.is_empty() {
            debug!(status = response.status, bytes = response.body.len(), "ignoring body of no-content call");
        }
        Ok(())
    }

    /// Build, execute and decode a single-call endpoint.
    ///
    /// # Errors
    /// Any error from building, executing or decoding.
    pub async fn call<E: Endpoint>(&self, endpoint: &E, cancel: &CancellationToken) -> Result<E::Output> {
        let request = endpoint.build_request()?;
        let response = self.execute(&request, cancel).await?;
        endpoint.decode_response(&response)
    }

    /// Fetch one page of a paged endpoint.
    ///
    /// # Errors
    /// Any error from building, executing or decoding.
    #[instrument(skip_all, fields(cursor = window.cursor(), page_number = window.page_number()))]
    pub async fn fetch_page<E: PagedEndpoint>(
        &self,
        endpoint: &E,
        window: &PageWindow,
        cancel: &CancellationToken,
    ) -> Result<PageResult<E::Record>> {
        let request = endpoint.build_page_request(window)?;
        let response = self.execute(&request, cancel).await?;
        let page = endpoint.decode_page(&response)?;
        debug!(records = page.records.len(), has_next = page.next_cursor.is_some(), "page fetched");
        Ok(page)
    }

    /// Lazily page through `endpoint`, starting at `first`.
    ///
    /// The paginator is single-pass; build a new one to restart.
    pub fn paginate<E>(
        &self,
        endpoint: E,
        first: PageWindow,
        cancel: &CancellationToken,
    ) -> Paginator<E::Record, impl FnMut(PageWindow) -> BoxFuture<'static, Result<PageResult<E::Record>>>>
    where
        E: PagedEndpoint + Send + Sync + 'static,
        E::Record: Send + 'static,
    {
        let mode = endpoint.pagination_mode();
        let endpoint = Arc::new(endpoint);
        let executor = self.clone();
        let token = cancel.clone();

        let fetch = move |window: PageWindow| {
            let executor = executor.clone();
            let endpoint = Arc::clone(&endpoint);
            let cancel = token.clone();
            async move { executor.fetch_page(endpoint.as_ref(), &window, &cancel).await }.boxed()
        };

        Paginator::new(fetch, first, mode, cancel.clone()).with_max_pages(self.max_pages)
    }

    /// One send, bounded by `timeout` and `cancel`.
    async fn attempt(
        &self,
        request: &RequestDescriptor,
        url: &str,
        credential: &Credential,
        timeout: std::time::Duration,
        cancel: &CancellationToken,
    ) -> Result<Attempt> {
        let http = self.http_request(request, url, credential);

        let sent = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CallwireError::Cancelled),
            sent = tokio::time::timeout(timeout, self.transport.send(http)) => sent,
        };

        let response = match sent {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Ok(network_failure(&err)),
            Err(_) => return Ok(network_failure(&TransportError::Timeout(timeout))),
        };

        if response.status == 401 {
            return Ok(Attempt::Unauthorized(response));
        }

        let retry_after = response.header("retry-after").and_then(parse_retry_after);
        match Outcome::from_status(response.status, retry_after) {
            Outcome::Success => Ok(Attempt::Done(response)),
            outcome => {
                let message = status_message(&response);
                Ok(Attempt::Failed { outcome, message, response: Some(response) })
            }
        }
    }

    /// Either sleep out the retry delay or produce the terminal error.
    async fn after_failure(
        &self,
        state: &mut RetryState,
        request: &RequestDescriptor,
        outcome: Outcome,
        message: String,
        response: Option<RawResponse>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let Some(kind) = outcome.transient_kind() else {
            let status = outcome.status().unwrap_or_default();
            let body = response.map(|r| r.text()).unwrap_or_default();
            debug!(status, "permanent failure");
            return Err(CallwireError::Permanent { status, body });
        };

        match self.policy.decide(state, &outcome, request.is_idempotent()) {
            RetryDecision::Stop => {
                warn!(%kind, attempts = state.attempts_made(), error = %message, "giving up");
                Err(terminal_transient(kind, &outcome, message, state.attempts_made()))
            }
            RetryDecision::RetryAfter(delay) => {
                warn!(
                    %kind,
                    attempt = state.attempt(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %message,
                    "retrying after transient failure"
                );
                state.record_error(message.clone());
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(CallwireError::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }
                if state.remaining().is_zero() {
                    warn!(%kind, attempts = state.attempts_made(), "call deadline reached");
                    return Err(terminal_transient(kind, &outcome, message, state.attempts_made()));
                }
                state.advance();
                Ok(())
            }
        }
    }

    fn http_request(&self, request: &RequestDescriptor, url: &str, credential: &Credential) -> HttpRequest {
        let mut headers = vec![
            ("Authorization".to_string(), credential.bearer()),
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.api.user_agent.clone()),
        ];
        if let Some(content_type) = request.content_type() {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }

        HttpRequest {
            method: request.method(),
            url: url.to_string(),
            headers,
            body: request.body().map(<[u8]>::to_vec),
        }
    }
}

fn network_failure(err: &TransportError) -> Attempt {
    let message = err.to_string();
    Attempt::Failed { outcome: Outcome::Network { message: message.clone() }, message, response: None }
}

fn status_message(response: &RawResponse) -> String {
    let mut body = response.text();
    if body.len() > MESSAGE_BODY_LIMIT {
        let mut end = MESSAGE_BODY_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    if body.trim().is_empty() {
        format!("HTTP {}", response.status)
    } else {
        format!("HTTP {}: {body}", response.status)
    }
}

fn terminal_transient(kind: TransientKind, outcome: &Outcome, message: String, attempts: u32) -> CallwireError {
    CallwireError::Transient { kind, status: outcome.status(), message, attempts }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use callwire_common::auth::CredentialSource;
    use callwire_common::resilience::Backoff;
    use callwire_domain::{ErrorKind, HttpMethod};
    use serde::Deserialize;

    use super::*;

    type Scripted = std::result::Result<RawResponse, TransportError>;

    /// Replays scripted responses and records what it was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<Scripted>>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self { script: Mutex::new(script.into()), sent: Mutex::default() })
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> std::result::Result<RawResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Other("script exhausted".into())))
        }
    }

    struct NumberedSource {
        fetches: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CredentialSource for NumberedSource {
        async fn fetch_credential(&self) -> Result<Credential> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CallwireError::Auth { message: "invalid_client".into(), status: Some(401) });
            }
            Credential::from_expires_in(format!("token-{n}"), 3600, None)
        }
    }

    fn source() -> Arc<NumberedSource> {
        Arc::new(NumberedSource { fetches: AtomicUsize::new(0), fail: false })
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(
            4,
            Backoff::new(Duration::from_millis(100), Duration::from_secs(1)),
            Duration::from_secs(60),
        )
    }

    fn executor(transport: Arc<ScriptedTransport>, source: Arc<NumberedSource>, policy: RetryPolicy) -> Executor {
        let api = ApiConfig { base_url: "https://api.example.test/v2/".to_string(), ..ApiConfig::default() };
        Executor::new(transport, TokenProvider::new(source, Duration::from_secs(60)), policy, api)
    }

    fn get_users() -> RequestDescriptor {
        RequestDescriptor::get()
            .segment("users")
            .with_query(|q| {
                q.append("page_size", 5_u32);
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn success_attaches_bearer_and_builds_url() {
        let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(200, r#"{"id":"u1"}"#))]);
        let executor = executor(transport.clone(), source(), policy());

        let response = executor.execute(&get_users(), &CancellationToken::new()).await.unwrap();

        assert_eq!(response.status, 200);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "https://api.example.test/v2/users?page_size=5");
        assert_eq!(sent[0].header("authorization"), Some("Bearer token-0"));
        assert_eq!(sent[0].header("content-type"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn server_errors_are_retried_with_same_credential() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse::new(503, "unavailable")),
            Err(TransportError::Connect("reset".into())),
            Ok(RawResponse::new(200, "{}")),
        ]);
        let source = source();
        let executor = executor(transport.clone(), source.clone(), policy());

        executor.execute(&get_users(), &CancellationToken::new()).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|r| r.header("authorization") == Some("Bearer token-0")));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    /// Validates the rate-limit scenario.
    ///
    /// Assertions:
    /// - the server's `Retry-After: 2` is waited out exactly
    /// - the second attempt succeeds
    #[tokio::test(start_paused = true)]
    async fn rate_limit_waits_for_retry_after() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse::new(429, "slow down").with_header("Retry-After", "2")),
            Ok(RawResponse::new(200, "{}")),
        ]);
        let executor = executor(transport.clone(), source(), policy());

        let started = tokio::time::Instant::now();
        executor.execute(&get_users(), &CancellationToken::new()).await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_secs(2));
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn client_errors_are_permanent_and_not_retried() {
        let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(404, r#"{"code":1001}"#))]);
        let executor = executor(transport.clone(), source(), policy());

        let err = executor.execute(&get_users(), &CancellationToken::new()).await.unwrap_err();

        assert_eq!(err, CallwireError::Permanent { status: 404, body: r#"{"code":1001}"#.to_string() });
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_transient_error() {
        let transport = ScriptedTransport::new((0..4).map(|_| Ok(RawResponse::new(500, ""))).collect());
        let executor = executor(transport.clone(), source(), policy());

        let err = executor.execute(&get_users(), &CancellationToken::new()).await.unwrap_err();

        match err {
            CallwireError::Transient { kind, status, attempts, message } => {
                assert_eq!(kind, TransientKind::Server);
                assert_eq!(status, Some(500));
                assert_eq!(attempts, 4);
                assert_eq!(message, "HTTP 500");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.sent().len(), 4);
    }

    #[tokio::test]
    async fn unauthorized_refreshes_credential_once() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse::new(401, "expired")),
            Ok(RawResponse::new(200, "{}")),
        ]);
        let source = source();
        let executor = executor(transport.clone(), source.clone(), policy());

        executor.execute(&get_users(), &CancellationToken::new()).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].header("authorization"), Some("Bearer token-0"));
        assert_eq!(sent[1].header("authorization"), Some("Bearer token-1"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_unauthorized_is_an_auth_error() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse::new(401, "")),
            Ok(RawResponse::new(401, "")),
        ]);
        let executor = executor(transport.clone(), source(), policy());

        let err = executor.execute(&get_users(), &CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.status(), Some(401));
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn unauthorized_resend_counts_toward_attempt_cap() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse::new(401, "expired")),
            Ok(RawResponse::new(503, "")),
        ]);
        let executor = executor(transport.clone(), source(), RetryPolicy::no_retry());

        let err = executor.execute(&get_users(), &CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.status(), Some(401));
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_resend_uses_up_an_attempt() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse::new(401, "expired")),
            Ok(RawResponse::new(503, "")),
            Ok(RawResponse::new(200, "{}")),
        ]);
        let two_attempts = RetryPolicy::new(
            2,
            Backoff::new(Duration::from_millis(100), Duration::from_secs(1)),
            Duration::from_secs(60),
        );
        let executor = executor(transport.clone(), source(), two_attempts);

        let err = executor.execute(&get_users(), &CancellationToken::new()).await.unwrap_err();

        assert!(
            matches!(err, CallwireError::Transient { status: Some(503), attempts: 2, .. }),
            "got {err:?}"
        );
        assert_eq!(transport.sent().len(), 2);
    }

    /// Answers 503 after `delay`.
    struct SlowTransport {
        delay: Duration,
        sends: AtomicUsize,
    }

    #[async_trait]
    impl Transport for SlowTransport {
        async fn send(&self, _request: HttpRequest) -> std::result::Result<RawResponse, TransportError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(RawResponse::new(503, ""))
        }
    }

    /// Validates that the call deadline bounds a slow attempt.
    ///
    /// Assertions:
    /// - a 20s response is cut off at the 1s deadline, not the 30s request timeout
    /// - the call ends as a transient network failure after one send
    #[tokio::test(start_paused = true)]
    async fn attempt_timeout_is_clamped_to_deadline() {
        let transport = Arc::new(SlowTransport { delay: Duration::from_secs(20), sends: AtomicUsize::new(0) });
        let policy = RetryPolicy::new(
            5,
            Backoff::new(Duration::from_millis(100), Duration::from_secs(1)),
            Duration::from_secs(1),
        );
        let api = ApiConfig { base_url: "https://api.example.test/v2".to_string(), ..ApiConfig::default() };
        assert_eq!(api.timeout(), Duration::from_secs(30));
        let executor = Executor::new(
            transport.clone(),
            TokenProvider::new(source(), Duration::from_secs(60)),
            policy,
            api,
        );

        let started = tokio::time::Instant::now();
        let err = executor.execute(&get_users(), &CancellationToken::new()).await.unwrap_err();

        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert!(
            matches!(err, CallwireError::Transient { kind: TransientKind::Network, attempts: 1, .. }),
            "got {err:?}"
        );
        assert_eq!(transport.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn credential_failure_short_circuits() {
        let transport = ScriptedTransport::new(vec![]);
        let source = Arc::new(NumberedSource { fetches: AtomicUsize::new(0), fail: true });
        let executor = executor(transport.clone(), source, policy());

        let err = executor.execute(&get_users(), &CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_backoff() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse::new(429, "").with_header("Retry-After", "30")),
            Ok(RawResponse::new(200, "{}")),
        ]);
        let executor = executor(transport.clone(), source(), policy());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = executor.execute(&get_users(), &cancel).await.unwrap_err();
        assert_eq!(err, CallwireError::Cancelled);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_idempotent_post_is_not_retried_when_disabled() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse::new(502, "")),
            Ok(RawResponse::new(201, "{}")),
        ]);
        let executor =
            executor(transport.clone(), source(), policy().with_retry_non_idempotent(false));
        let request = RequestDescriptor::post()
            .segment("users")
            .json_body(&serde_json::json!({"email": "a@example.test"}))
            .build()
            .unwrap();

        let err = executor.execute(&request, &CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transient);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn execute_json_reports_decode_errors() {
        #[derive(Debug, Deserialize)]
        struct User {
            #[allow(dead_code)]
            id: String,
        }

        let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(200, "not json"))]);
        let executor = executor(transport, source(), policy());

        let err = executor.execute_json::<User>(&get_users(), &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn execute_no_content_accepts_204() {
        let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(204, ""))]);
        let executor = executor(transport.clone(), source(), policy());
        let request = RequestDescriptor::delete().segment("users").segment("u1").build().unwrap();

        executor.execute_no_content(&request, &CancellationToken::new()).await.unwrap();
        assert_eq!(transport.sent()[0].method, HttpMethod::Delete);
    }
}
