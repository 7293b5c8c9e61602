//! Fixed spacing between outbound calls.

use std::time::Duration;

/// Sleeps a fixed delay before every call except the first.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    calls: usize,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, calls: 0 }
    }

    /// Waits until the next call may be made.
    pub async fn wait(&mut self) {
        if self.calls > 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls += 1;
    }

    /// Calls paced so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn first_call_is_immediate() {
        let mut pacer = Pacer::new(Duration::from_secs(60));
        let started = Instant::now();
        pacer.wait().await;
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(pacer.calls(), 1);
    }

    #[tokio::test]
    async fn later_calls_wait_the_delay() {
        let mut pacer = Pacer::new(Duration::from_millis(30));
        let started = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        pacer.wait().await;
        assert!(started.elapsed() >= Duration::from_millis(60));
        assert_eq!(pacer.calls(), 3);
    }
}
