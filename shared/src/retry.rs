//! Bounded retry for the browser's submission request.

use std::{fmt, future::Future};

/// Why one request attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// The request never produced an HTTP response.
    Network(String),
    /// The server answered with a non-success status.
    Status { status: u16, message: String },
    /// A success response whose body could not be read.
    Decode(String),
}

impl RequestFailure {
    /// Only server-side failures and transport errors are worth repeating.
    pub fn is_retryable(&self) -> bool {
        match self {
            RequestFailure::Network(_) => true,
            RequestFailure::Status { status, .. } => (500..=599).contains(status),
            RequestFailure::Decode(_) => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            RequestFailure::Network(_) => {
                "Network error. Please check your connection and try again.".to_string()
            },
            RequestFailure::Status { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFailure::Network(detail) => write!(f, "network error: {detail}"),
            RequestFailure::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            RequestFailure::Decode(detail) => write!(f, "decode error: {detail}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based): base, 2×base, 3×base...
    pub fn delay_ms(&self, retry: u32) -> u32 {
        self.base_delay_ms.saturating_mul(retry.max(1))
    }
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of retries. `sleep` is awaited between attempts so the
/// loop stays independent of any particular timer.
pub async fn run_with_retry<T, Attempt, AttemptFut, Sleep, SleepFut>(
    policy: RetryPolicy,
    mut attempt: Attempt,
    mut sleep: Sleep,
) -> Result<T, RequestFailure>
where
    Attempt: FnMut() -> AttemptFut,
    AttemptFut: Future<Output = Result<T, RequestFailure>>,
    Sleep: FnMut(u32) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let mut retries = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(failure) if failure.is_retryable() && retries < policy.max_retries => {
                retries += 1;
                sleep(policy.delay_ms(retries)).await;
            },
            Err(failure) => return Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque};

    use super::*;

    fn server_error() -> RequestFailure {
        RequestFailure::Status {
            status: 503,
            message: "HTTP 503".to_string(),
        }
    }

    #[test]
    fn classifies_retryable_failures() {
        assert!(server_error().is_retryable());
        assert!(RequestFailure::Network("offline".to_string()).is_retryable());
        assert!(!RequestFailure::Status {
            status: 429,
            message: "Too many submissions".to_string()
        }
        .is_retryable());
        assert!(!RequestFailure::Status {
            status: 400,
            message: "Validation failed".to_string()
        }
        .is_retryable());
    }

    #[tokio::test]
    async fn retries_transient_failures_with_growing_delay() {
        let outcomes = RefCell::new(VecDeque::from(vec![
            Err(server_error()),
            Err(RequestFailure::Network("reset".to_string())),
            Ok("created"),
        ]));
        let delays = RefCell::new(Vec::new());

        let result = run_with_retry(
            RetryPolicy::default(),
            || {
                let next = outcomes.borrow_mut().pop_front();
                async move { next.unwrap_or(Ok("unexpected")) }
            },
            |ms| {
                delays.borrow_mut().push(ms);
                async {}
            },
        )
        .await;

        assert_eq!(result, Ok("created"));
        assert_eq!(*delays.borrow(), vec![1000, 2000]);
    }

    #[tokio::test]
    async fn stops_after_max_retries() {
        let calls = RefCell::new(0);
        let result: Result<(), _> = run_with_retry(
            RetryPolicy::default(),
            || {
                *calls.borrow_mut() += 1;
                async { Err(server_error()) }
            },
            |_| async {},
        )
        .await;

        assert_eq!(result, Err(server_error()));
        assert_eq!(*calls.borrow(), 4);
    }

    #[tokio::test]
    async fn client_errors_surface_immediately() {
        let calls = RefCell::new(0);
        let rejected = RequestFailure::Status {
            status: 400,
            message: "Validation failed".to_string(),
        };
        let result: Result<(), _> = run_with_retry(
            RetryPolicy::default(),
            || {
                *calls.borrow_mut() += 1;
                let failure = rejected.clone();
                async move { Err(failure) }
            },
            |_| async {},
        )
        .await;

        assert_eq!(result, Err(rejected.clone()));
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(rejected.user_message(), "Validation failed");
    }
}
