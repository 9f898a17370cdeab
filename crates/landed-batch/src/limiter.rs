//! Call budget shared by every task of a batch
//!
//! Injected into the runner rather than held in a global, so each batch
//! (and each test) owns its own window.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct Window {
    started: Instant,
    used: u32,
}

/// Fixed-window call counter
#[derive(Debug)]
pub struct CallCounter {
    limit: u32,
    window: Duration,
    state: Mutex<Window>,
}

impl CallCounter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(Window {
                started: Instant::now(),
                used: 0,
            }),
        }
    }

    fn with_window<T>(&self, f: impl FnOnce(&mut Window) -> T) -> T {
        // Poisoning leaves two plain integers intact.
        let mut window = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if window.started.elapsed() >= self.window {
            window.started = Instant::now();
            window.used = 0;
        }
        f(&mut window)
    }

    /// Take one call from the budget; false once the window is spent.
    pub fn try_acquire(&self) -> bool {
        let limit = self.limit;
        self.with_window(|w| {
            if w.used < limit {
                w.used += 1;
                true
            } else {
                false
            }
        })
    }

    pub fn remaining(&self) -> u32 {
        let limit = self.limit;
        self.with_window(|w| limit.saturating_sub(w.used))
    }

    /// Start a fresh window now
    pub fn reset(&self) {
        let mut window = self.state.lock().unwrap_or_else(|e| e.into_inner());
        window.started = Instant::now();
        window.used = 0;
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_window_exhausts_and_rolls_over() {
        let counter = CallCounter::new(2, Duration::from_secs(60));
        assert!(counter.try_acquire());
        assert!(counter.try_acquire());
        assert!(!counter.try_acquire());
        assert_eq!(counter.remaining(), 0);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(counter.remaining(), 2);
        assert!(counter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset() {
        let counter = CallCounter::new(1, Duration::from_secs(60));
        assert!(counter.try_acquire());
        counter.reset();
        assert!(counter.try_acquire());
    }
}
