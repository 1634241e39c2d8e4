use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Fixed-interval pacing shared by every outbound request: the next request
/// starts no sooner than `delay` after the previous one finished.
pub struct Throttle {
    delay: Duration,
    finished: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            finished: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until at least `delay` has passed since the previous request
    /// completed.
    pub async fn wait(&self) {
        let finished = *self.finished.lock().await;
        if let Some(prev) = finished {
            let elapsed = prev.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
    }

    /// Mark the current request as done, successful or not.
    pub async fn finish(&self) {
        *self.finished.lock().await = Some(Instant::now());
    }
}
