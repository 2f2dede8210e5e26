//! Retry decisions for transient failures
//!
//! The policy here is pure: it looks at an attempt's outcome and the call's
//! bookkeeping and answers "wait this long and try again" or "stop". The
//! executor in `callwire-core` does the sleeping.

pub mod retry;

pub use retry::{parse_retry_after, Backoff, Outcome, RetryDecision, RetryPolicy, RetryState};
