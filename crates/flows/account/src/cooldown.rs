//! The resend cooldown timer.
//!
//! A 1 Hz countdown driving the "resend code" button: the action is
//! disabled while the counter is above zero. Restarting replaces the
//! running ticker (never stacks a second one), and dropping the value
//! cancels it, so a torn-down flow leaves no callback behind.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Countdown gating the resend action.
#[derive(Debug)]
pub struct ResendCooldown {
    remaining: Arc<AtomicU32>,
    ticker: Option<JoinHandle<()>>,
}

impl ResendCooldown {
    /// Creates an idle cooldown (resend allowed).
    pub fn idle() -> Self {
        Self {
            remaining: Arc::new(AtomicU32::new(0)),
            ticker: None,
        }
    }

    /// Starts (or restarts) the countdown at `seconds`. Any running
    /// ticker is cancelled first.
    pub fn start(&mut self, seconds: u32) {
        self.cancel();
        self.remaining.store(seconds, Ordering::SeqCst);
        if seconds == 0 {
            return;
        }

        let remaining = Arc::clone(&self.remaining);
        self.ticker = Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            // consume the immediate first tick
            tick.tick().await;
            loop {
                tick.tick().await;
                let left = remaining.load(Ordering::SeqCst).saturating_sub(1);
                remaining.store(left, Ordering::SeqCst);
                if left == 0 {
                    break;
                }
            }
        }));
    }

    /// Stops the ticker without touching the counter.
    pub fn cancel(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    /// Stops the ticker and returns the counter to zero.
    pub fn reset(&mut self) {
        self.cancel();
        self.remaining.store(0, Ordering::SeqCst);
    }

    /// Seconds left until resend is allowed again.
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// True while the resend action must stay disabled.
    pub fn is_active(&self) -> bool {
        self.remaining() > 0
    }
}

impl Drop for ResendCooldown {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn let_ticker_run() {
        // give the spawned ticker a chance to observe the advanced clock
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_once_per_second() {
        let mut cooldown = ResendCooldown::idle();
        cooldown.start(3);
        assert_eq!(cooldown.remaining(), 3);
        assert!(cooldown.is_active());

        tokio::time::advance(Duration::from_secs(1)).await;
        let_ticker_run().await;
        assert_eq!(cooldown.remaining(), 2);

        tokio::time::advance(Duration::from_secs(2)).await;
        let_ticker_run().await;
        assert_eq!(cooldown.remaining(), 0);
        assert!(!cooldown.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resets_instead_of_stacking() {
        let mut cooldown = ResendCooldown::idle();
        cooldown.start(60);

        tokio::time::advance(Duration::from_secs(10)).await;
        let_ticker_run().await;
        assert_eq!(cooldown.remaining(), 50);

        cooldown.start(60);
        assert_eq!(cooldown.remaining(), 60);

        // one ticker, one decrement per second
        tokio::time::advance(Duration::from_secs(1)).await;
        let_ticker_run().await;
        assert_eq!(cooldown.remaining(), 59);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_freezes_counter() {
        let mut cooldown = ResendCooldown::idle();
        cooldown.start(30);
        cooldown.cancel();

        tokio::time::advance(Duration::from_secs(5)).await;
        let_ticker_run().await;
        assert_eq!(cooldown.remaining(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_is_inactive() {
        let cooldown = ResendCooldown::idle();
        assert!(!cooldown.is_active());
        assert_eq!(cooldown.remaining(), 0);
    }
}
