//! Bounded wait-and-retry driver for standing bot challenges.
//!
//! Not a backoff loop: the challenge is resolved by an external human actor
//! during the wait window, so a fixed cadence is appropriate. The sleep is a
//! plain `tokio::time::sleep` suspension, so the whole poll is cancellable
//! from the outside (dropping the future proceeds straight to session
//! teardown in the caller).

use std::future::Future;
use std::time::Duration;

use crate::challenge::ChallengeState;
use crate::error::ScraperError;
use crate::session::FetchOutcome;

/// Policy knobs for one poll instance. The defaults give the operator
/// roughly a five-minute resolution window.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(5),
        }
    }
}

/// Why a poll ended without a fetch outcome.
#[derive(Debug)]
pub enum PollError {
    /// The challenge was still standing after `max_attempts` checks.
    Timeout,
    /// Re-checking the page content itself failed.
    Check(ScraperError),
}

/// Re-checks `check` at a fixed cadence until it reports `Clear`, then
/// invokes `on_clear` exactly once and returns its outcome verbatim.
///
/// The first check runs immediately; sleeps only happen between challenged
/// checks, so `check` runs at most `max_attempts` times and the loop never
/// ends on a wasted sleep.
///
/// # Errors
///
/// [`PollError::Timeout`] after `max_attempts` challenged checks;
/// [`PollError::Check`] if a re-check fails outright.
pub async fn poll_until_clear<C, CFut, F, FFut>(
    policy: &PollPolicy,
    mut check: C,
    on_clear: F,
) -> Result<FetchOutcome, PollError>
where
    C: FnMut() -> CFut,
    CFut: Future<Output = Result<ChallengeState, ScraperError>>,
    F: FnOnce() -> FFut,
    FFut: Future<Output = FetchOutcome>,
{
    let mut attempts = 0u32;
    loop {
        match check().await.map_err(PollError::Check)? {
            ChallengeState::Clear => return Ok(on_clear().await),
            ChallengeState::Challenged => {}
        }

        attempts += 1;
        if attempts >= policy.max_attempts {
            return Err(PollError::Timeout);
        }

        tracing::warn!(
            attempts,
            max_attempts = policy.max_attempts,
            "challenge still standing; waiting for manual resolution"
        );
        tokio::time::sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn zero_interval(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            max_attempts,
            interval: Duration::ZERO,
        }
    }

    fn ok_outcome() -> FetchOutcome {
        FetchOutcome::Success {
            status: 200,
            body: "[]".to_owned(),
        }
    }

    #[tokio::test]
    async fn clear_on_first_check_invokes_on_clear_once() {
        let clears = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&clears);
        let result = poll_until_clear(
            &zero_interval(3),
            || async { Ok::<_, ScraperError>(ChallengeState::Clear) },
            || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    ok_outcome()
                }
            },
        )
        .await;
        assert!(matches!(result, Ok(FetchOutcome::Success { status: 200, .. })));
        assert_eq!(clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clears_after_k_attempts_and_returns_refetched_outcome() {
        let checks = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&checks);
        let result = poll_until_clear(
            &zero_interval(10),
            || {
                let cc = Arc::clone(&cc);
                async move {
                    let n = cc.fetch_add(1, Ordering::SeqCst);
                    if n < 3 {
                        Ok::<_, ScraperError>(ChallengeState::Challenged)
                    } else {
                        Ok(ChallengeState::Clear)
                    }
                }
            },
            || async {
                FetchOutcome::Success {
                    status: 200,
                    body: "refetched".to_owned(),
                }
            },
        )
        .await;
        assert_eq!(checks.load(Ordering::SeqCst), 4);
        match result {
            Ok(FetchOutcome::Success { body, .. }) => assert_eq!(body, "refetched"),
            other => panic!("expected refetched outcome, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn times_out_after_max_attempts_without_invoking_on_clear() {
        let checks = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&checks);
        let clears = Arc::new(AtomicU32::new(0));
        let cl = Arc::clone(&clears);
        let result = poll_until_clear(
            &zero_interval(4),
            || {
                let cc = Arc::clone(&cc);
                async move {
                    cc.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ScraperError>(ChallengeState::Challenged)
                }
            },
            || {
                let cl = Arc::clone(&cl);
                async move {
                    cl.fetch_add(1, Ordering::SeqCst);
                    ok_outcome()
                }
            },
        )
        .await;
        assert!(matches!(result, Err(PollError::Timeout)));
        assert_eq!(checks.load(Ordering::SeqCst), 4);
        assert_eq!(clears.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn check_failure_propagates_immediately() {
        let result = poll_until_clear(
            &zero_interval(5),
            || async {
                Err::<ChallengeState, _>(ScraperError::Browser {
                    message: "page gone".to_owned(),
                })
            },
            || async { ok_outcome() },
        )
        .await;
        assert!(
            matches!(result, Err(PollError::Check(ScraperError::Browser { .. }))),
            "expected Check(Browser), got: {result:?}"
        );
    }

    #[tokio::test]
    async fn transport_error_from_on_clear_is_returned_verbatim() {
        let result = poll_until_clear(
            &zero_interval(2),
            || async { Ok::<_, ScraperError>(ChallengeState::Clear) },
            || async {
                FetchOutcome::TransportError {
                    message: "connection reset".to_owned(),
                }
            },
        )
        .await;
        assert!(matches!(result, Ok(FetchOutcome::TransportError { .. })));
    }
}
