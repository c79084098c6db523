use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Process-wide readiness state shared by every listener.
///
/// `ready_at` is fixed at construction; `ready` flips from `false` to `true`
/// at most once and never reverts.
#[derive(Debug)]
pub struct ReadinessGate {
    ready: AtomicBool,
    ready_at: Instant,
    startup_delay: Duration,
}

impl ReadinessGate {
    pub fn new(startup_delay: Duration) -> Self {
        Self {
            ready: AtomicBool::new(startup_delay.is_zero()),
            ready_at: Instant::now() + startup_delay,
            startup_delay,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Whole seconds until the startup window closes, rounded down. Zero once ready.
    pub fn remaining_startup_seconds(&self) -> u64 {
        if self.is_ready() {
            return 0;
        }
        self.ready_at
            .saturating_duration_since(Instant::now())
            .as_secs()
    }

    pub fn startup_delay(&self) -> Duration {
        self.startup_delay
    }

    /// Opens the gate. Returns `true` only for the call that performed the transition.
    pub fn mark_ready(&self) -> bool {
        !self.ready.swap(true, Ordering::AcqRel)
    }

    /// Waits out the startup window, logging progress once per second, then
    /// opens the gate. Returns `false` without opening it if `shutdown` fires first.
    pub async fn run_countdown(&self, shutdown: &CancellationToken) -> bool {
        if self.is_ready() {
            return true;
        }

        let mut ticker = tokio::time::interval(COUNTDOWN_TICK);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!("⏹️ Startup countdown aborted by shutdown");
                    return false;
                }
                _ = tokio::time::sleep_until(self.ready_at) => break,
                _ = ticker.tick() => {
                    let remaining = self.ready_at.saturating_duration_since(Instant::now());
                    tracing::info!(
                        "⏳ Startup in progress... {}s remaining",
                        remaining.as_secs_f64().ceil()
                    );
                }
            }
        }

        self.mark_ready();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_zero_delay_is_ready_immediately() {
        let gate = ReadinessGate::new(Duration::ZERO);
        assert!(gate.is_ready());
        assert_eq!(gate.remaining_startup_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_seconds_round_down() {
        let gate = ReadinessGate::new(Duration::from_secs(3));
        assert!(!gate.is_ready());
        assert_eq!(gate.remaining_startup_seconds(), 3);

        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(gate.remaining_startup_seconds(), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(gate.remaining_startup_seconds(), 0);
        // The flag only flips through the countdown.
        assert!(!gate.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_opens_gate_after_delay() {
        let gate = ReadinessGate::new(Duration::from_secs(2));
        let started = Instant::now();

        let opened = gate.run_countdown(&CancellationToken::new()).await;

        assert!(opened);
        assert!(gate.is_ready());
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(gate.remaining_startup_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_aborts_on_shutdown() {
        let gate = Arc::new(ReadinessGate::new(Duration::from_secs(60)));
        let token = CancellationToken::new();

        let task = {
            let gate = gate.clone();
            let token = token.clone();
            tokio::spawn(async move { gate.run_countdown(&token).await })
        };

        tokio::time::sleep(Duration::from_secs(2)).await;
        token.cancel();

        assert!(!task.await.unwrap());
        assert!(!gate.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_is_monotonic() {
        let gate = ReadinessGate::new(Duration::from_secs(4));
        let mut previous = gate.remaining_startup_seconds();
        for _ in 0..10 {
            tokio::time::advance(Duration::from_millis(700)).await;
            let current = gate.remaining_startup_seconds();
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_mark_ready_transitions_once() {
        let gate = ReadinessGate::new(Duration::from_secs(10));
        assert!(gate.mark_ready());
        assert!(!gate.mark_ready());
        assert!(gate.is_ready());
    }
}
