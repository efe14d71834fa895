use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::errors::AppiumResult;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Poll `check` until it yields `true` or `timeout` passes.
///
/// The check always runs at least once. Returns whether the condition was
/// met; errors from the check abort the wait.
pub(crate) async fn wait_until<F, Fut>(timeout: Duration, mut check: F) -> AppiumResult<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppiumResult<bool>>,
{
    let deadline = deadline_after(timeout);
    loop {
        if check().await? {
            return Ok(true);
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(false);
                }
                POLL_INTERVAL.min(deadline - now)
            }
            None => POLL_INTERVAL,
        };
        sleep(pause).await;
    }
}

/// `None` when the deadline lies beyond what the clock can represent.
pub(crate) fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

pub(crate) fn has_passed(deadline: Option<Instant>) -> bool {
    deadline.map_or(false, |deadline| Instant::now() >= deadline)
}

/// Seconds to a duration; negative or NaN is zero, overflow saturates.
pub(crate) fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn returns_once_condition_holds() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let met = wait_until(Duration::from_secs(5), move || async move {
            Ok(calls.fetch_add(1, Ordering::SeqCst) >= 2)
        })
        .await
        .unwrap();
        assert!(met);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_timeout() {
        let met = wait_until(Duration::from_secs(1), || async { Ok(false) })
            .await
            .unwrap();
        assert!(!met);
    }

    #[test]
    fn seconds_saturate_instead_of_panicking() {
        assert_eq!(seconds(-3.0), Duration::ZERO);
        assert_eq!(seconds(f64::NAN), Duration::ZERO);
        assert_eq!(seconds(1e20), Duration::MAX);
        assert_eq!(seconds(f64::INFINITY), Duration::MAX);
        assert_eq!(seconds(1.5), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_timeout_still_checks_first() {
        let met = wait_until(seconds(f64::INFINITY), || async { Ok(true) })
            .await
            .unwrap();
        assert!(met);
        assert!(deadline_after(Duration::MAX).is_none());
        assert!(!has_passed(None));
    }
}
