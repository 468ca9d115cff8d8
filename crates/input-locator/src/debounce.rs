//! Quiescence timer for the observation loop.
//!
//! A [`Debouncer`] holds at most one deadline. Every [`arm`](Debouncer::arm) pushes the deadline
//! out to `now + window`, so a burst of triggers resolves into a single firing one window after
//! the last of them. [`fired`](Debouncer::fired) is cancel-safe and meant to sit in a
//! `tokio::select!` loop next to the event stream that arms it.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
    collapsed: usize,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            collapsed: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// (Re)starts the window.
    pub fn arm(&mut self) {
        self.arm_for(self.window);
    }

    /// (Re)starts the timer with an explicit delay, replacing any pending deadline.
    pub fn arm_for(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
        self.collapsed += 1;
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.collapsed = 0;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Completes when the pending deadline passes and returns how many arms it absorbed.
    /// Pends forever while disarmed.
    pub async fn fired(&mut self) -> usize {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
                std::mem::take(&mut self.collapsed)
            }
            None => std::future::pending().await,
        }
    }
}
