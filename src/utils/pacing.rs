use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::DelayRange;

impl DelayRange {
    /// A random duration inside the window.
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }

    pub async fn pause(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}
