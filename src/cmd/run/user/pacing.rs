use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Constant-pacing tick source.
///
/// The next tick is anchored `interval` after the previous tick *started*,
/// independent of how long the tick's work took. A tick that overruns its
/// interval fires the next one immediately and re-anchors the schedule, so
/// slow ticks compress the effective rate instead of bursting to catch up.
pub struct ConstantPacer {
    interval: Duration,
    next: Instant,
}

impl ConstantPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Wait until the next tick is due.
    pub async fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next {
            sleep_until(self.next).await;
            self.next += self.interval;
        } else {
            self.next = now + self.interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time;

    const INTERVAL: Duration = Duration::from_millis(500);

    #[tokio::test(flavor = "current_thread")]
    async fn first_tick_fires_immediately() {
        time::pause();

        let mut pacer = ConstantPacer::new(INTERVAL);
        let t0 = Instant::now();
        pacer.wait().await;
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fast_ticks_are_spaced_by_the_interval() {
        time::pause();

        let mut pacer = ConstantPacer::new(INTERVAL);
        let t0 = Instant::now();

        // instant work: every subsequent tick starts one interval apart
        pacer.wait().await;
        pacer.wait().await;
        assert_eq!(t0.elapsed(), INTERVAL);
        pacer.wait().await;
        assert_eq!(t0.elapsed(), 2 * INTERVAL);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn overrunning_tick_fires_immediately_and_reanchors() {
        time::pause();

        let mut pacer = ConstantPacer::new(INTERVAL);
        pacer.wait().await;
        pacer.wait().await; // starts at t=500ms, next due at t=1000ms

        // the tick's work overruns its slot by 200ms
        time::advance(Duration::from_millis(700)).await;
        let t0 = Instant::now(); // t=1200ms
        pacer.wait().await;
        assert_eq!(t0.elapsed(), Duration::ZERO);

        // schedule is re-anchored on the late tick's start
        pacer.wait().await;
        assert_eq!(t0.elapsed(), INTERVAL);
    }
}
