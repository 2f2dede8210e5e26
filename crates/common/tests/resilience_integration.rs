//! Integration tests for resilience module
//!
//! Drives a retry loop the way the executor does: one [`RetryState`] per
//! call, [`RetryPolicy::decide`] after each failed attempt, sleeping for the
//! decided delay on a paused clock.

use std::time::Duration;

use callwire_common::resilience::{
    parse_retry_after, Backoff, Outcome, RetryDecision, RetryPolicy,
};
use tokio::time::Instant;

/// Run `outcomes` through `policy` until success or a stop decision.
///
/// Returns the number of attempts made and whether the call succeeded.
async fn drive(policy: &RetryPolicy, outcomes: &[Outcome], idempotent: bool) -> (u32, bool) {
    let mut state = policy.start();
    for outcome in outcomes {
        if *outcome == Outcome::Success {
            return (state.attempts_made(), true);
        }
        state.record_error(format!("{outcome:?}"));
        match policy.decide(&state, outcome, idempotent) {
            RetryDecision::RetryAfter(delay) => {
                tokio::time::sleep(delay).await;
                state.advance();
            }
            RetryDecision::Stop => return (state.attempts_made(), false),
        }
    }
    (state.attempts_made(), false)
}

/// Validates recovery from transient failures within the attempt cap.
///
/// # Test Steps
/// 1. Configure 5 attempts with 10ms base backoff
/// 2. Fail twice with 503, then succeed
/// 3. Confirm exactly 3 attempts were made
#[tokio::test(start_paused = true)]
async fn test_retry_recovers_from_server_errors() {
    let policy = RetryPolicy::new(
        5,
        Backoff::new(Duration::from_millis(10), Duration::from_millis(100)),
        Duration::from_secs(10),
    );
    let outcomes = [
        Outcome::from_status(503, None),
        Outcome::from_status(502, None),
        Outcome::Success,
    ];

    let (attempts, succeeded) = drive(&policy, &outcomes, true).await;

    assert!(succeeded);
    assert_eq!(attempts, 3);
}

/// Validates that the attempt cap bounds total sends.
#[tokio::test(start_paused = true)]
async fn test_retry_max_attempts_exceeded() {
    let policy = RetryPolicy::new(
        3,
        Backoff::new(Duration::from_millis(10), Duration::from_millis(100)),
        Duration::from_secs(10),
    );
    let outcomes = vec![Outcome::Network { message: "connection reset".into() }; 10];

    let (attempts, succeeded) = drive(&policy, &outcomes, true).await;

    assert!(!succeeded);
    assert_eq!(attempts, 3);
}

/// Validates that a server-supplied `Retry-After` is waited exactly.
///
/// # Test Steps
/// 1. Parse a `Retry-After: 2` header
/// 2. Fail once with 429 carrying that delay, then succeed
/// 3. Confirm the paused clock advanced by exactly two seconds
#[tokio::test(start_paused = true)]
async fn test_rate_limit_waits_for_retry_after() {
    let policy = RetryPolicy::new(
        5,
        Backoff::new(Duration::from_millis(500), Duration::from_secs(30)),
        Duration::from_secs(60),
    );
    let retry_after = parse_retry_after("2");
    let outcomes = [Outcome::from_status(429, retry_after), Outcome::Success];

    let started = Instant::now();
    let (attempts, succeeded) = drive(&policy, &outcomes, true).await;

    assert!(succeeded);
    assert_eq!(attempts, 2);
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

/// Validates that the call deadline stops retries whose wait would overrun it.
#[tokio::test(start_paused = true)]
async fn test_deadline_stops_long_waits() {
    let policy = RetryPolicy::new(
        5,
        Backoff::new(Duration::from_millis(10), Duration::from_millis(100)),
        Duration::from_secs(5),
    );
    let outcomes = [Outcome::from_status(429, Some(Duration::from_secs(30))), Outcome::Success];

    let started = Instant::now();
    let (attempts, succeeded) = drive(&policy, &outcomes, true).await;

    assert!(!succeeded);
    assert_eq!(attempts, 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

/// Validates idempotency handling for POST/PATCH style requests.
///
/// # Test Steps
/// 1. Disable retries for non-idempotent requests
/// 2. Confirm a 5xx stops after one attempt
/// 3. Confirm a 429 is still retried
#[tokio::test(start_paused = true)]
async fn test_non_idempotent_requests() {
    let policy = RetryPolicy::new(
        5,
        Backoff::new(Duration::from_millis(10), Duration::from_millis(100)),
        Duration::from_secs(10),
    )
    .with_retry_non_idempotent(false);

    let (attempts, succeeded) =
        drive(&policy, &[Outcome::from_status(500, None), Outcome::Success], false).await;
    assert!(!succeeded);
    assert_eq!(attempts, 1);

    let (attempts, succeeded) =
        drive(&policy, &[Outcome::from_status(429, None), Outcome::Success], false).await;
    assert!(succeeded);
    assert_eq!(attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn test_client_errors_are_not_retried() {
    let policy = RetryPolicy::default();

    for status in [400, 403, 404, 409] {
        let (attempts, succeeded) =
            drive(&policy, &[Outcome::from_status(status, None), Outcome::Success], true).await;
        assert!(!succeeded, "{status} should not be retried");
        assert_eq!(attempts, 1);
    }
}
