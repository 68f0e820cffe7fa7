//! Shared poll-until-terminal helper
//!
//! `pause`, `resume`, and `clear` all follow the same pattern: issue a
//! command, then re-read remote state until a terminal value appears or the
//! budget runs out. Keeping the loop in one place guarantees identical
//! timeout semantics everywhere.

use agentbay_api_contract::ContractError;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::error::AgentBayResult;

/// Check a caller-supplied poll interval before any command is issued.
///
/// Zero, negative, and non-finite intervals are rejected: a zero interval
/// degenerates into a busy loop against the status endpoint, and
/// `Duration::from_secs_f64` panics on the rest.
pub(crate) fn interval_from_secs(secs: f64) -> Result<Duration, ContractError> {
    if secs.is_finite() && secs > 0.0 {
        Ok(Duration::from_secs_f64(secs))
    } else {
        Err(ContractError::InvalidPollInterval(secs))
    }
}

/// Repeatedly run `check` until it reports a terminal value or `timeout`
/// elapses.
///
/// `check` returns `Ok(Some(v))` when terminal, `Ok(None)` to keep polling;
/// errors propagate immediately. `Ok(None)` from this function means the
/// timeout elapsed; the remote operation may still complete afterwards, no
/// cancellation is attempted.
pub(crate) async fn poll_until<T, F, Fut>(
    mut check: F,
    timeout: Duration,
    interval: Duration,
) -> AgentBayResult<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AgentBayResult<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = check().await? {
            return Ok(Some(value));
        }
        let now = Instant::now();
        if now + interval > deadline {
            return Ok(None);
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentBayError;
    use agentbay_api_contract::ContractError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn returns_value_once_terminal() {
        let ticks = AtomicU32::new(0);
        let result = poll_until(
            || async {
                let n = ticks.fetch_add(1, Ordering::SeqCst);
                Ok(if n >= 3 { Some(n) } else { None })
            },
            Duration::from_secs(60),
            Duration::from_secs(2),
        )
        .await
        .unwrap();
        assert_eq!(result, Some(3));
        assert_eq!(ticks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_never_terminal() {
        let ticks = AtomicU32::new(0);
        let result: Option<u32> = poll_until(
            || async {
                ticks.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            },
            Duration::from_secs(10),
            Duration::from_secs(3),
        )
        .await
        .unwrap();
        assert_eq!(result, None);
        // Ticks at t=0, 3, 6, 9; the next would land past the deadline.
        assert_eq!(ticks.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn rejects_non_positive_intervals() {
        assert_eq!(interval_from_secs(2.5).unwrap(), Duration::from_secs_f64(2.5));
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                interval_from_secs(bad),
                Err(ContractError::InvalidPollInterval(_))
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn propagates_errors_immediately() {
        let result: AgentBayResult<Option<u32>> = poll_until(
            || async { Err(AgentBayError::Contract(ContractError::EmptyField("sessionId"))) },
            Duration::from_secs(60),
            Duration::from_secs(2),
        )
        .await;
        assert!(result.is_err());
    }
}
