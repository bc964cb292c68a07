//! Invocation context: time budget for one handled request.
use std::time::{Duration, Instant};

/// Per-invocation execution budget handed to the pipeline by its host.
#[derive(Debug, Clone, Copy)]
pub struct InvocationContext {
    /// When the host received the request.
    pub received_at: Instant,
    /// Hard deadline imposed by the host, if any.
    pub deadline: Option<Instant>,
}

impl InvocationContext {
    /// Context without a deadline.
    pub fn unbounded() -> Self {
        Self {
            received_at: Instant::now(),
            deadline: None,
        }
    }

    /// Context whose deadline is `budget` after now.
    pub fn with_budget(budget: Duration) -> Self {
        let now = Instant::now();
        Self {
            received_at: now,
            deadline: Some(now + budget),
        }
    }

    /// Remaining execution time. `None` means unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Time spent since the request was received.
    pub fn elapsed(&self) -> Duration {
        self.received_at.elapsed()
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::unbounded()
    }
}
