use log::debug;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct RateWindow {
    window_start: Option<Instant>,
    request_count: u32,
}

/// Fixed-window limiter: at most `quota` acquisitions per `window`.
///
/// A burst of `quota` requests right after a reset is allowed back-to-back,
/// so up to `2 * quota` requests can land around a window boundary.
#[derive(Debug)]
pub struct RateLimiter {
    quota: u32,
    window: Duration,
    state: Mutex<RateWindow>,
}

impl RateLimiter {
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            quota: quota.max(1),
            window,
            state: Mutex::new(RateWindow::default()),
        }
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait until one more request fits in the current window, then count it.
    ///
    /// The lock is held across the sleep so later callers queue behind the
    /// one that is waiting for the window to roll over.
    pub async fn acquire(&self) {
        let mut w = self.state.lock().await;
        let now = Instant::now();

        let elapsed = match w.window_start {
            Some(start) if now.saturating_duration_since(start) < self.window => {
                now.saturating_duration_since(start)
            }
            _ => {
                w.window_start = Some(now);
                w.request_count = 0;
                Duration::ZERO
            }
        };

        if w.request_count >= self.quota {
            let wait = self.window.saturating_sub(elapsed);
            if !wait.is_zero() {
                debug!(
                    "rate limit reached ({} requests), waiting {:?}",
                    w.request_count, wait
                );
                tokio::time::sleep(wait).await;
            }
            w.request_count = 0;
            w.window_start = Some(Instant::now());
        }

        w.request_count += 1;
    }

    /// Requests counted in the current window; 0 once the window has expired.
    pub async fn in_window(&self) -> u32 {
        let w = self.state.lock().await;
        match w.window_start {
            Some(start) if start.elapsed() < self.window => w.request_count,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn quota_requests_pass_without_delay() {
        let limiter = RateLimiter::new(25, Duration::from_secs(60));
        let start = Instant::now();
        for _ in 0..25 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_window().await, 25);
    }

    #[tokio::test(start_paused = true)]
    async fn next_request_waits_for_remaining_window() {
        let limiter = RateLimiter::new(3, Duration::from_millis(60_000));
        for _ in 0..3 {
            limiter.acquire().await;
        }
        tokio::time::advance(Duration::from_secs(10)).await;

        let before = Instant::now();
        limiter.acquire().await;
        let waited = before.elapsed();
        assert!(waited >= Duration::from_secs(50), "waited {:?}", waited);
        assert!(waited < Duration::from_secs(51), "waited {:?}", waited);
        // fresh window with the delayed request counted
        assert_eq!(limiter.in_window().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn counter_resets_after_window_elapses() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));
        limiter.acquire().await;
        limiter.acquire().await;
        tokio::time::advance(Duration::from_millis(1_001)).await;
        assert_eq!(limiter.in_window().await, 0);

        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_window().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_window_never_waits() {
        let limiter = RateLimiter::new(1, Duration::ZERO);
        let before = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
