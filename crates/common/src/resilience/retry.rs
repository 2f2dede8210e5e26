//! Retry policy for API calls
//!
//! This module decides, after each attempt of a logical call, whether another
//! attempt is worth making and how long to wait first. It never sleeps and
//! never performs I/O itself; the executor owns the loop and the waiting.
//!
//! Classification:
//! - network failure: retryable, exponential backoff
//! - 429: retryable, server `Retry-After` honored, otherwise exponential backoff
//! - 5xx: retryable, exponential backoff
//! - any other 4xx and success: stop
//!
//! Backoff is `base * 2^attempt`, capped at `max_delay`, plus uniform jitter
//! in `[0, base]`.

use std::time::Duration;

use callwire_domain::config::RetryConfig;
use callwire_domain::TransientKind;
use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::time::Instant;
use tracing::debug;

/// Stand-in deadline for effectively unbounded budgets.
const FAR_FUTURE_SECS: u64 = 30 * 365 * 24 * 60 * 60;

/// Result of one attempt, as seen by the policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The request never produced a response (connect, timeout, reset).
    Network { message: String },
    /// HTTP 429, with the server's requested wait if it sent one.
    RateLimited { retry_after: Option<Duration> },
    ServerError { status: u16 },
    ClientError { status: u16 },
}

impl Outcome {
    /// Classify a received HTTP status.
    pub fn from_status(status: u16, retry_after: Option<Duration>) -> Self {
        match status {
            200..=299 => Self::Success,
            429 => Self::RateLimited { retry_after },
            500..=599 => Self::ServerError { status },
            _ => Self::ClientError { status },
        }
    }

    /// Transient category, or `None` for success and permanent failures.
    pub fn transient_kind(&self) -> Option<TransientKind> {
        match self {
            Self::Network { .. } => Some(TransientKind::Network),
            Self::RateLimited { .. } => Some(TransientKind::RateLimited),
            Self::ServerError { .. } => Some(TransientKind::Server),
            Self::Success | Self::ClientError { .. } => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::ServerError { status } | Self::ClientError { status } => Some(*status),
            Self::Success | Self::Network { .. } => None,
        }
    }
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then attempt again.
    RetryAfter(Duration),
    Stop,
}

/// Exponential backoff: `base * 2^attempt`, capped at `max_delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max_delay: Duration,
}

impl Backoff {
    pub const fn new(base: Duration, max_delay: Duration) -> Self {
        Self { base, max_delay }
    }

    /// Delay before jitter for a 0-based attempt; non-decreasing in `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay plus uniform jitter in `[0, base]`.
    pub fn jittered(&self, attempt: u32) -> Duration {
        let base_ms = u64::try_from(self.base.as_millis()).unwrap_or(u64::MAX);
        let jitter = if base_ms == 0 { 0 } else { rand::thread_rng().gen_range(0..=base_ms) };
        self.delay(attempt) + Duration::from_millis(jitter)
    }
}

/// Per-call retry bookkeeping
///
/// Created when a logical call starts and dropped when it resolves; never
/// shared between calls.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt: u32,
    started: Instant,
    deadline: Instant,
    last_error: Option<String>,
}

impl RetryState {
    /// Start bookkeeping for a call that must finish within `budget`.
    pub fn new(budget: Duration) -> Self {
        let started = Instant::now();
        let deadline = started
            .checked_add(budget)
            .unwrap_or_else(|| started + Duration::from_secs(FAR_FUTURE_SECS));
        Self { attempt: 0, started, deadline, last_error: None }
    }

    /// 0-based index of the attempt currently being made.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Number of attempts made so far, counting the current one.
    pub fn attempts_made(&self) -> u32 {
        self.attempt + 1
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn record_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    /// Move on to the next attempt.
    pub fn advance(&mut self) {
        self.attempt += 1;
    }
}

/// Retry policy for one logical call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    deadline: Duration,
    retry_non_idempotent: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff, deadline: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), backoff, deadline, retry_non_idempotent: true }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::new(
                Duration::from_millis(config.base_delay_ms),
                Duration::from_millis(config.max_delay_ms),
            ),
            deadline: Duration::from_secs(config.deadline_secs),
            retry_non_idempotent: config.retry_non_idempotent,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(1, Backoff::new(Duration::ZERO, Duration::ZERO), Duration::MAX)
    }

    #[must_use]
    pub fn with_retry_non_idempotent(mut self, enabled: bool) -> Self {
        self.retry_non_idempotent = enabled;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Fresh bookkeeping for a call governed by this policy.
    pub fn start(&self) -> RetryState {
        RetryState::new(self.deadline)
    }

    /// Decide from the attempt index and outcome alone.
    ///
    /// `attempt` is the 0-based index of the attempt that produced `outcome`.
    pub fn should_retry(&self, attempt: u32, outcome: &Outcome) -> RetryDecision {
        if outcome.transient_kind().is_none() {
            return RetryDecision::Stop;
        }
        if attempt.saturating_add(1) >= self.max_attempts {
            return RetryDecision::Stop;
        }
        match outcome {
            Outcome::RateLimited { retry_after: Some(delay) } => RetryDecision::RetryAfter(*delay),
            _ => RetryDecision::RetryAfter(self.backoff.jittered(attempt)),
        }
    }

    /// Full decision for one call: attempt cap, idempotency and deadline.
    pub fn decide(&self, state: &RetryState, outcome: &Outcome, idempotent: bool) -> RetryDecision {
        if !idempotent
            && !self.retry_non_idempotent
            && matches!(outcome, Outcome::Network { .. } | Outcome::ServerError { .. })
        {
            debug!(attempt = state.attempt(), "not retrying non-idempotent request");
            return RetryDecision::Stop;
        }

        if state.remaining().is_zero() {
            debug!(attempt = state.attempt(), "call deadline exhausted");
            return RetryDecision::Stop;
        }

        match self.should_retry(state.attempt(), outcome) {
            RetryDecision::RetryAfter(delay) if delay > state.remaining() => {
                debug!(
                    attempt = state.attempt(),
                    delay_ms = delay.as_millis() as u64,
                    remaining_ms = state.remaining().as_millis() as u64,
                    "retry delay would overrun the call deadline"
                );
                RetryDecision::Stop
            }
            decision => decision,
        }
    }
}

/// Parse a `Retry-After` header value.
///
/// Accepts delta-seconds (`"2"`) and HTTP-dates
/// (`"Wed, 21 Oct 2015 07:28:00 GMT"`). A date in the past yields zero.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    parse_retry_after_at(value, Utc::now())
}

pub fn parse_retry_after_at(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}
